//! Aggregation of per-device counters into the metric registry.
//!
//! One pass enumerates partitions, reads counters for each and appends one
//! observation per series, tagged with `device` and `mountpoint`. Collaborator
//! failures are logged and absorbed: a failed enumeration yields an empty
//! registry, a failed counter read skips that device.

use tracing::{debug, info, warn};

use crate::collectors::{resolve_device_name, CollectorError, DiskSource, IoCounters};
use crate::filter::DeviceFilter;
use crate::metrics::*;

pub const TAG_DEVICE: &str = "device";
pub const TAG_MOUNTPOINT: &str = "mountpoint";

/// Outcome of one collection pass.
#[derive(Debug, Clone)]
pub struct CollectionReport {
    pub registry: MetricRegistry,
    /// Partitions returned by enumeration.
    pub partitions: usize,
    /// Devices whose counters were recorded.
    pub recorded: usize,
    /// Devices dropped by the device filter.
    pub filtered: usize,
    /// Collaborator failures (enumeration or counter retrieval).
    pub failures: usize,
}

impl CollectionReport {
    fn new(registry: MetricRegistry) -> Self {
        Self {
            registry,
            partitions: 0,
            recorded: 0,
            filtered: 0,
            failures: 0,
        }
    }

    pub fn is_partial(&self) -> bool {
        self.failures > 0
    }
}

/// Appends one observation per series for a device's counters.
pub fn record_counters(
    registry: &mut MetricRegistry,
    tags: &Tags,
    counters: &IoCounters,
) -> Result<(), MetricsError> {
    let values = [
        (DISK_READ_BYTES, counters.read_bytes),
        (DISK_WRITE_BYTES, counters.write_bytes),
        (DISK_READ_COUNT, counters.read_count),
        (DISK_WRITE_COUNT, counters.write_count),
        (DISK_READ_TIME, counters.read_time),
        (DISK_WRITE_TIME, counters.write_time),
        (DISK_IO_TIME, counters.io_time),
        (DISK_WEIGHTED_IO, counters.weighted_io),
        (DISK_IOPS_IN_PROGRESS, counters.iops_in_progress),
        (DISK_MERGED_READ_COUNT, counters.merged_read_count),
        (DISK_MERGED_WRITE_COUNT, counters.merged_write_count),
    ];

    for (name, value) in values {
        registry.add_observation(name, tags.clone(), value as f64)?;
    }
    Ok(())
}

/// Runs one collection pass against `source`.
///
/// `extra_tags` are attached to every observation; `device` and
/// `mountpoint` always take precedence over them.
pub fn collect_disk_metrics(
    source: &dyn DiskSource,
    filter: &DeviceFilter,
    extra_tags: &Tags,
) -> CollectionReport {
    let mut report = CollectionReport::new(MetricRegistry::initialize());

    let partitions = match source.partitions() {
        Ok(partitions) => partitions,
        Err(e) => {
            warn!("{}", e);
            report.failures += 1;
            Vec::new()
        }
    };
    report.partitions = partitions.len();
    debug!("Found {} partitions", partitions.len());

    for partition in &partitions {
        let name = resolve_device_name(&partition.device);
        if !filter.allows(&name) {
            debug!("Skipping filtered device {}", partition.device);
            report.filtered += 1;
            continue;
        }

        let counters = match source.io_counters(&partition.device) {
            Ok(counters) => counters,
            Err(e @ CollectorError::DeviceNotFound(_)) => {
                info!("{} (mountpoint {})", e, partition.mountpoint);
                report.failures += 1;
                continue;
            }
            Err(e) => {
                warn!("{}", e);
                report.failures += 1;
                continue;
            }
        };

        let mut tags = extra_tags.clone();
        tags.insert(TAG_DEVICE.to_string(), counters.name.clone());
        tags.insert(TAG_MOUNTPOINT.to_string(), partition.mountpoint.clone());

        match record_counters(&mut report.registry, &tags, &counters) {
            Ok(()) => report.recorded += 1,
            Err(e) => {
                warn!("Failed to record counters for {}: {}", counters.name, e);
                report.failures += 1;
            }
        }
    }

    info!(
        "Collected {} of {} partitions ({} filtered, {} failures)",
        report.recorded, report.partitions, report.filtered, report.failures
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collectors::Partition;

    struct FailingEnumeration;

    impl DiskSource for FailingEnumeration {
        fn partitions(&self) -> Result<Vec<Partition>, CollectorError> {
            Err(CollectorError::Enumeration("mount table unavailable".into()))
        }

        fn io_counters(&self, device: &str) -> Result<IoCounters, CollectorError> {
            Err(CollectorError::DeviceNotFound(device.to_string()))
        }
    }

    #[test]
    fn test_record_counters_fills_every_series() {
        let mut registry = MetricRegistry::initialize();
        let counters = IoCounters {
            name: "sda".into(),
            read_bytes: 1,
            write_bytes: 2,
            read_count: 3,
            write_count: 4,
            read_time: 5,
            write_time: 6,
            io_time: 7,
            weighted_io: 8,
            iops_in_progress: 9,
            merged_read_count: 10,
            merged_write_count: 11,
        };

        record_counters(&mut registry, &Tags::new(), &counters).unwrap();

        let expected = [
            (DISK_READ_BYTES, 1.0),
            (DISK_WRITE_BYTES, 2.0),
            (DISK_READ_COUNT, 3.0),
            (DISK_WRITE_COUNT, 4.0),
            (DISK_READ_TIME, 5.0),
            (DISK_WRITE_TIME, 6.0),
            (DISK_IO_TIME, 7.0),
            (DISK_WEIGHTED_IO, 8.0),
            (DISK_IOPS_IN_PROGRESS, 9.0),
            (DISK_MERGED_READ_COUNT, 10.0),
            (DISK_MERGED_WRITE_COUNT, 11.0),
        ];
        for (name, value) in expected {
            let obs = registry.get(name).unwrap().observations();
            assert_eq!(obs.len(), 1, "{}", name);
            assert_eq!(obs[0].value, value, "{}", name);
        }
    }

    #[test]
    fn test_enumeration_failure_yields_empty_registry() {
        let report =
            collect_disk_metrics(&FailingEnumeration, &DeviceFilter::default(), &Tags::new());
        assert_eq!(report.registry.len(), 11);
        assert_eq!(report.registry.observation_count(), 0);
        assert_eq!(report.failures, 1);
        assert!(report.is_partial());
    }
}
