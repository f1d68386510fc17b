//! Metric series definitions for check-disk-io.
//!
//! This module defines the fixed catalog of disk I/O metric series and the
//! registry that accumulates tagged observations for them during one
//! collection pass. Series identity (name, type, help) is set from the
//! catalog and never changes afterwards; only observations are appended.

use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// Tag set attached to one observation, ordered by key.
pub type Tags = BTreeMap<String, String>;

/// Declared semantic type of a metric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricType {
    Counter,
    Gauge,
}

impl MetricType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricType::Counter => "COUNTER",
            MetricType::Gauge => "GAUGE",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static definition of a metric series.
#[derive(Debug, Clone, Copy)]
pub struct MetricDef {
    pub name: &'static str,
    pub metric_type: MetricType,
    pub help: &'static str,
}

const HELP_BYTES: &str =
    "These values count the number of bytes read from or written to this block device.";
const HELP_COUNT: &str = "These values increment when an I/O request completes.";
const HELP_TIME: &str = "These values count the number of milliseconds that I/O requests have waited on this block device. If there are multiple I/O requests waiting, these values will increase at a rate greater than 1000/second; for example, if 60 read requests wait for an average of 30 ms, the read_time field will increase by 60*30 = 1800.";
const HELP_IO_TIME: &str = "This value counts the number of milliseconds during which the device has had I/O requests queued.";
const HELP_WEIGHTED_IO: &str = "This value counts the number of milliseconds that I/O requests have waited on this block device. If there are multiple I/O requests waiting, this value will increase as the product of the number of milliseconds times the number of requests waiting (see disk_read_time for an example).";
const HELP_IN_PROGRESS: &str = "This value counts the number of I/O requests that have been issued to the device driver but have not yet completed. It does not include I/O requests that are in the queue but not yet issued to the device driver.";
const HELP_MERGED: &str = "Reads and writes which are adjacent to each other may be merged for efficiency. Thus, two 4K reads may become one 8K read before it is ultimately handed to the disk, and so it will be counted (and queued) as only one I/O. These fields lets you know how often this was done.";

pub const DISK_READ_BYTES: &str = "disk_read_bytes";
pub const DISK_WRITE_BYTES: &str = "disk_write_bytes";
pub const DISK_READ_COUNT: &str = "disk_read_count";
pub const DISK_WRITE_COUNT: &str = "disk_write_count";
pub const DISK_READ_TIME: &str = "disk_read_time";
pub const DISK_WRITE_TIME: &str = "disk_write_time";
pub const DISK_IO_TIME: &str = "disk_io_time";
pub const DISK_WEIGHTED_IO: &str = "disk_weighted_io";
pub const DISK_IOPS_IN_PROGRESS: &str = "disk_iops_in_progress";
pub const DISK_MERGED_READ_COUNT: &str = "disk_merged_read_count";
pub const DISK_MERGED_WRITE_COUNT: &str = "disk_merged_write_count";

/// The fixed catalog of disk I/O series. Names, types and help strings are
/// consumed by downstream tooling and must stay stable.
pub const DISK_METRICS: [MetricDef; 11] = [
    MetricDef {
        name: DISK_READ_BYTES,
        metric_type: MetricType::Counter,
        help: HELP_BYTES,
    },
    MetricDef {
        name: DISK_WRITE_BYTES,
        metric_type: MetricType::Counter,
        help: HELP_BYTES,
    },
    MetricDef {
        name: DISK_READ_COUNT,
        metric_type: MetricType::Counter,
        help: HELP_COUNT,
    },
    MetricDef {
        name: DISK_WRITE_COUNT,
        metric_type: MetricType::Counter,
        help: HELP_COUNT,
    },
    MetricDef {
        name: DISK_READ_TIME,
        metric_type: MetricType::Counter,
        help: HELP_TIME,
    },
    MetricDef {
        name: DISK_WRITE_TIME,
        metric_type: MetricType::Counter,
        help: HELP_TIME,
    },
    MetricDef {
        name: DISK_IO_TIME,
        metric_type: MetricType::Counter,
        help: HELP_IO_TIME,
    },
    MetricDef {
        name: DISK_WEIGHTED_IO,
        metric_type: MetricType::Counter,
        help: HELP_WEIGHTED_IO,
    },
    MetricDef {
        name: DISK_IOPS_IN_PROGRESS,
        metric_type: MetricType::Gauge,
        help: HELP_IN_PROGRESS,
    },
    MetricDef {
        name: DISK_MERGED_READ_COUNT,
        metric_type: MetricType::Counter,
        help: HELP_MERGED,
    },
    MetricDef {
        name: DISK_MERGED_WRITE_COUNT,
        metric_type: MetricType::Counter,
        help: HELP_MERGED,
    },
];

/// Errors raised by registry lookups.
#[derive(Debug, thiserror::Error)]
pub enum MetricsError {
    #[error("Unknown metric series: {0}")]
    UnknownSeries(String),
}

/// One tagged sample within a series.
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub tags: Tags,
    pub value: f64,
}

/// A named, typed series and the observations appended to it.
#[derive(Debug, Clone)]
pub struct MetricSeries {
    name: &'static str,
    metric_type: MetricType,
    help: &'static str,
    observations: Vec<Observation>,
}

impl MetricSeries {
    pub fn new(def: &MetricDef) -> Self {
        Self {
            name: def.name,
            metric_type: def.metric_type,
            help: def.help,
            observations: Vec::new(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn metric_type(&self) -> MetricType {
        self.metric_type
    }

    pub fn help(&self) -> &'static str {
        self.help
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Appends an observation. Repeated tag sets are kept as separate
    /// samples and the value is stored as given.
    pub fn add_observation(&mut self, tags: Tags, value: f64) {
        self.observations.push(Observation { tags, value });
    }
}

/// Registry of all series for one collection pass, keyed by series name.
#[derive(Debug, Clone)]
pub struct MetricRegistry {
    series: BTreeMap<&'static str, MetricSeries>,
}

impl MetricRegistry {
    /// Creates a registry holding every series of [`DISK_METRICS`], empty.
    pub fn initialize() -> Self {
        Self::from_catalog(&DISK_METRICS)
    }

    pub fn from_catalog(catalog: &[MetricDef]) -> Self {
        let series = catalog
            .iter()
            .map(|def| (def.name, MetricSeries::new(def)))
            .collect();
        Self { series }
    }

    pub fn add_observation(
        &mut self,
        name: &str,
        tags: Tags,
        value: f64,
    ) -> Result<(), MetricsError> {
        let series = self
            .series
            .get_mut(name)
            .ok_or_else(|| MetricsError::UnknownSeries(name.to_string()))?;
        series.add_observation(tags, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&MetricSeries> {
        self.series.get(name)
    }

    /// Iterates the series in name order.
    pub fn iter(&self) -> btree_map::Values<'_, &'static str, MetricSeries> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of observations across all series.
    pub fn observation_count(&self) -> usize {
        self.series.values().map(|s| s.observations.len()).sum()
    }
}

impl<'a> IntoIterator for &'a MetricRegistry {
    type Item = &'a MetricSeries;
    type IntoIter = btree_map::Values<'a, &'static str, MetricSeries>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
