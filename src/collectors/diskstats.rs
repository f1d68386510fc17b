//! Disk I/O statistics collector.
//!
//! This module reads per-device I/O counters from `<proc_root>/diskstats`.

use std::fs;
use std::path::Path;

use super::CollectorError;

/// I/O counters for a single block device.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IoCounters {
    pub name: String,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_count: u64,
    pub write_count: u64,
    pub read_time: u64,
    pub write_time: u64,
    pub io_time: u64,
    pub weighted_io: u64,
    pub iops_in_progress: u64,
    pub merged_read_count: u64,
    pub merged_write_count: u64,
}

/// Last path component of a device path (`/dev/sda1` -> `sda1`).
pub fn device_basename(device: &str) -> &str {
    device
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(device)
}

/// Resolves a partition device to the name diskstats lists it under.
///
/// Device-mapper volumes are mounted through symlinks such as
/// `/dev/mapper/vg-root -> ../dm-0` while diskstats names them `dm-0`, so
/// the path is canonicalized first. Paths that cannot be resolved fall back
/// to their basename.
pub fn resolve_device_name(device: &str) -> String {
    match fs::canonicalize(device) {
        Ok(resolved) => match resolved.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => device_basename(device).to_string(),
        },
        Err(_) => device_basename(device).to_string(),
    }
}

/// Parses diskstats content.
///
/// Format: major minor name read_ios read_merges read_sectors read_ticks write_ios
/// write_merges write_sectors write_ticks ios_in_progress time_in_queue weighted_time_in_queue
///
/// Lines with fewer than 14 fields are skipped. Unparsable numbers read as 0.
pub fn parse_diskstats(content: &str, sector_size: u64) -> Vec<IoCounters> {
    let mut stats = Vec::new();

    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 14 {
            continue; // Skip malformed lines
        }

        let field = |i: usize| parts[i].parse::<u64>().unwrap_or(0);

        stats.push(IoCounters {
            name: parts[2].to_string(),
            read_count: field(3),
            merged_read_count: field(4),
            read_bytes: field(5).saturating_mul(sector_size),
            read_time: field(6),
            write_count: field(7),
            merged_write_count: field(8),
            write_bytes: field(9).saturating_mul(sector_size),
            write_time: field(10),
            iops_in_progress: field(11),
            io_time: field(12),
            weighted_io: field(13),
        });
    }

    stats
}

/// Reads counters for `device` from `<proc_root>/diskstats`.
pub fn read_io_counters(
    proc_root: &Path,
    device: &str,
    sector_size: u64,
) -> Result<IoCounters, CollectorError> {
    let path = proc_root.join("diskstats");
    let content = fs::read_to_string(&path).map_err(|e| CollectorError::Counters {
        device: device.to_string(),
        reason: format!("Failed to read {}: {}", path.display(), e),
    })?;

    let resolved = resolve_device_name(device);
    let basename = device_basename(device);
    let mut stats = parse_diskstats(&content, sector_size);

    let position = stats
        .iter()
        .position(|s| s.name == resolved)
        .or_else(|| stats.iter().position(|s| s.name == basename));

    match position {
        Some(i) => Ok(stats.swap_remove(i)),
        None => Err(CollectorError::DeviceNotFound(resolved)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
   8       0 sda 1000 10 2048 300 500 20 4096 700 2 900 1000 0 0 0 0
   8       1 sda1 900 5 2000 250 400 15 4000 600 0 800 850
 259       0 nvme0n1 1 2 3 4 5 6 7 8 9 10 11
   7       0 loop0 broken
";

    #[test]
    fn test_parse_diskstats_fields() {
        let stats = parse_diskstats(SAMPLE, 512);
        assert_eq!(stats.len(), 3);

        let sda = &stats[0];
        assert_eq!(sda.name, "sda");
        assert_eq!(sda.read_count, 1000);
        assert_eq!(sda.merged_read_count, 10);
        assert_eq!(sda.read_bytes, 2048 * 512);
        assert_eq!(sda.read_time, 300);
        assert_eq!(sda.write_count, 500);
        assert_eq!(sda.merged_write_count, 20);
        assert_eq!(sda.write_bytes, 4096 * 512);
        assert_eq!(sda.write_time, 700);
        assert_eq!(sda.iops_in_progress, 2);
        assert_eq!(sda.io_time, 900);
        assert_eq!(sda.weighted_io, 1000);

        let nvme = &stats[2];
        assert_eq!(nvme.name, "nvme0n1");
        assert_eq!(nvme.weighted_io, 11);
    }

    #[test]
    fn test_parse_diskstats_sector_size() {
        let stats = parse_diskstats(SAMPLE, 4096);
        assert_eq!(stats[1].read_bytes, 2000 * 4096);
    }

    #[test]
    fn test_device_basename() {
        assert_eq!(device_basename("/dev/sda1"), "sda1");
        assert_eq!(device_basename("nvme0n1p2"), "nvme0n1p2");
    }

    #[test]
    fn test_resolve_device_name_follows_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        let dev = dir.path().join("dev");
        fs::create_dir_all(dev.join("mapper")).unwrap();
        fs::write(dev.join("dm-0"), "").unwrap();
        std::os::unix::fs::symlink("../dm-0", dev.join("mapper/vg-root")).unwrap();

        let mapper = dev.join("mapper/vg-root");
        assert_eq!(resolve_device_name(mapper.to_str().unwrap()), "dm-0");
        assert_eq!(resolve_device_name("/nonexistent/dev/sdq1"), "sdq1");
    }

    #[test]
    fn test_read_io_counters_device_mapper() {
        let dir = tempfile::tempdir().unwrap();
        let dev = dir.path().join("dev");
        fs::create_dir_all(dev.join("mapper")).unwrap();
        fs::write(dev.join("dm-0"), "").unwrap();
        std::os::unix::fs::symlink("../dm-0", dev.join("mapper/vg-root")).unwrap();
        fs::write(
            dir.path().join("diskstats"),
            format!("{} 253       0 dm-0 70 0 560 12 80 0 640 30 0 40 42\n", SAMPLE),
        )
        .unwrap();

        let mapper = dev.join("mapper/vg-root");
        let counters = read_io_counters(dir.path(), mapper.to_str().unwrap(), 512).unwrap();
        assert_eq!(counters.name, "dm-0");
        assert_eq!(counters.read_count, 70);
        assert_eq!(counters.read_bytes, 560 * 512);
        assert_eq!(counters.weighted_io, 42);
    }

    #[test]
    fn test_read_io_counters_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_io_counters(dir.path(), "/dev/sda", 512).unwrap_err();
        assert!(matches!(err, CollectorError::Counters { .. }));
    }

    #[test]
    fn test_read_io_counters_lookup() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("diskstats"), SAMPLE).unwrap();

        let sda1 = read_io_counters(dir.path(), "/dev/sda1", 512).unwrap();
        assert_eq!(sda1.name, "sda1");
        assert_eq!(sda1.read_count, 900);

        let err = read_io_counters(dir.path(), "/dev/sdz", 512).unwrap_err();
        assert!(matches!(err, CollectorError::DeviceNotFound(ref n) if n == "sdz"));
    }
}
