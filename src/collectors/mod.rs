//! Collectors module for disk I/O data.
//!
//! This module contains the collaborators that enumerate mounted partitions
//! and read per-device I/O counters. [`DiskSource`] is the seam between the
//! operating system and the aggregation step; [`ProcDiskSource`] implements
//! it on top of procfs.

pub mod diskstats;
pub mod partitions;

use std::path::{Path, PathBuf};

pub use diskstats::{device_basename, parse_diskstats, resolve_device_name, IoCounters};
pub use partitions::{parse_mounts, Partition};

/// Default sector size used to convert sector counts into bytes.
pub const DEFAULT_SECTOR_SIZE: u64 = 512;

/// Errors raised by disk data collaborators.
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("Failed to enumerate partitions: {0}")]
    Enumeration(String),

    #[error("Failed to read I/O counters for {device}: {reason}")]
    Counters { device: String, reason: String },

    #[error("Device '{0}' not found in diskstats")]
    DeviceNotFound(String),
}

/// Source of partitions and per-device counters.
pub trait DiskSource {
    /// Lists mounted partitions in mount order.
    fn partitions(&self) -> Result<Vec<Partition>, CollectorError>;

    /// Reads I/O counters for a partition's device.
    fn io_counters(&self, device: &str) -> Result<IoCounters, CollectorError>;
}

/// [`DiskSource`] backed by a procfs tree.
#[derive(Debug, Clone)]
pub struct ProcDiskSource {
    proc_root: PathBuf,
    all_partitions: bool,
    sector_size: u64,
}

impl ProcDiskSource {
    pub fn new(proc_root: impl Into<PathBuf>, all_partitions: bool, sector_size: u64) -> Self {
        Self {
            proc_root: proc_root.into(),
            all_partitions,
            sector_size,
        }
    }

    pub fn proc_root(&self) -> &Path {
        &self.proc_root
    }
}

impl Default for ProcDiskSource {
    fn default() -> Self {
        Self::new("/proc", false, DEFAULT_SECTOR_SIZE)
    }
}

impl DiskSource for ProcDiskSource {
    fn partitions(&self) -> Result<Vec<Partition>, CollectorError> {
        partitions::read_partitions(&self.proc_root, self.all_partitions)
    }

    fn io_counters(&self, device: &str) -> Result<IoCounters, CollectorError> {
        diskstats::read_io_counters(&self.proc_root, device, self.sector_size)
    }
}
