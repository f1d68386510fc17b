//! Check plugin entry point.
//!
//! Runs one collection pass and writes the report. The check always ends in
//! [`CheckState::Ok`]; collaborator failures only show up in the logs and in
//! the returned [`CollectionReport`].

use std::fmt;
use std::io::{self, Write};

use crate::collection::{collect_disk_metrics, CollectionReport};
use crate::collectors::DiskSource;
use crate::exposition::write_registry;
use crate::filter::DeviceFilter;
use crate::metrics::Tags;

pub const PLUGIN_NAME: &str = "check-disk-io";
pub const PLUGIN_SHORT: &str = "Check disk IO and provide metrics";

/// Check result states and their process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckState {
    Ok,
    Warning,
    Critical,
    Unknown,
}

impl CheckState {
    pub fn exit_code(&self) -> i32 {
        match self {
            CheckState::Ok => 0,
            CheckState::Warning => 1,
            CheckState::Critical => 2,
            CheckState::Unknown => 3,
        }
    }
}

impl fmt::Display for CheckState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CheckState::Ok => "OK",
            CheckState::Warning => "WARNING",
            CheckState::Critical => "CRITICAL",
            CheckState::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Collects disk metrics from `source` and writes the report to `out`.
pub fn run_check<W: Write>(
    source: &dyn DiskSource,
    filter: &DeviceFilter,
    extra_tags: &Tags,
    out: &mut W,
) -> io::Result<(CheckState, CollectionReport)> {
    let report = collect_disk_metrics(source, filter, extra_tags);
    write_registry(out, &report.registry)?;
    out.flush()?;
    Ok((CheckState::Ok, report))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CheckState::Ok.exit_code(), 0);
        assert_eq!(CheckState::Warning.exit_code(), 1);
        assert_eq!(CheckState::Critical.exit_code(), 2);
        assert_eq!(CheckState::Unknown.exit_code(), 3);
        assert_eq!(CheckState::Unknown.to_string(), "UNKNOWN");
    }
}
