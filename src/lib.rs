//! check-disk-io library
//!
//! This library collects per-device disk I/O counters and renders them as a
//! text metrics report. It is split into:
//!
//! - **Collectors**: enumerate mounted partitions and read per-device counters
//!   behind the [`DiskSource`] trait
//! - **Metrics**: the fixed catalog of 11 disk series and the registry that
//!   accumulates tagged observations
//! - **Exposition**: line-oriented text rendering of the registry
//!
//! # Usage
//!
//! ```rust
//! use check_disk_io::{render_registry, MetricRegistry, Tags};
//!
//! let mut registry = MetricRegistry::initialize();
//!
//! let mut tags = Tags::new();
//! tags.insert("device".to_string(), "sda".to_string());
//! tags.insert("mountpoint".to_string(), "/".to_string());
//! registry.add_observation("disk_read_bytes", tags, 1024.0).unwrap();
//!
//! let text = render_registry(&registry);
//! assert!(text.contains("disk_read_bytes{device=\"sda\",mountpoint=\"/\"} 1024\n"));
//! ```

pub mod check;
pub mod collection;
pub mod collectors;
pub mod exposition;
pub mod filter;
pub mod metrics;

// Re-export main types for convenience
pub use check::{run_check, CheckState, PLUGIN_NAME, PLUGIN_SHORT};
pub use collection::{collect_disk_metrics, record_counters, CollectionReport};
pub use collectors::{CollectorError, DiskSource, IoCounters, Partition, ProcDiskSource};
pub use exposition::{format_tags, format_value, render_registry, render_series, write_registry};
pub use filter::{DeviceFilter, FilterError};
pub use metrics::{
    MetricDef, MetricRegistry, MetricSeries, MetricType, MetricsError, Observation, Tags,
    DISK_METRICS,
};
