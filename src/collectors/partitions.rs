//! Mounted partition enumeration.
//!
//! This module reads the mount table from procfs and, unless all partitions
//! are requested, keeps only filesystems backed by a block device.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tracing::debug;

use super::CollectorError;

/// A mounted partition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub device: String,
    pub mountpoint: String,
    pub fstype: String,
    pub options: String,
}

/// Reads mounted partitions from `<proc_root>/self/mounts`, falling back to
/// `<proc_root>/mounts`.
pub fn read_partitions(proc_root: &Path, all: bool) -> Result<Vec<Partition>, CollectorError> {
    let content = fs::read_to_string(proc_root.join("self/mounts"))
        .or_else(|_| fs::read_to_string(proc_root.join("mounts")))
        .map_err(|e| {
            CollectorError::Enumeration(format!(
                "Failed to read mount table under {}: {}",
                proc_root.display(),
                e
            ))
        })?;

    let mounts = parse_mounts(&content);
    if all {
        return Ok(mounts);
    }

    let physical = match fs::read_to_string(proc_root.join("filesystems")) {
        Ok(content) => Some(parse_physical_filesystems(&content)),
        Err(e) => {
            debug!(
                "Cannot read {}/filesystems ({}), using static pseudo filesystem list",
                proc_root.display(),
                e
            );
            None
        }
    };

    Ok(mounts
        .into_iter()
        .filter(|p| match &physical {
            Some(types) => types.contains(p.fstype.as_str()),
            None => !is_pseudo_filesystem(&p.fstype),
        })
        .collect())
}

/// Parses mount table content (`device mountpoint fstype options dump pass`).
pub fn parse_mounts(content: &str) -> Vec<Partition> {
    content
        .lines()
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return None;
            }
            Some(Partition {
                device: unescape_mount_field(parts[0]),
                mountpoint: unescape_mount_field(parts[1]),
                fstype: parts[2].to_string(),
                options: parts[3].to_string(),
            })
        })
        .collect()
}

/// Filesystem types in `/proc/filesystems` that are not flagged `nodev`.
fn parse_physical_filesystems(content: &str) -> HashSet<String> {
    content
        .lines()
        .filter(|line| !line.starts_with("nodev"))
        .map(|line| line.trim().to_string())
        .filter(|fstype| !fstype.is_empty())
        .collect()
}

/// Decodes the octal escapes the kernel uses for whitespace and backslashes
/// in mount fields (`\040` is a space).
fn unescape_mount_field(field: &str) -> String {
    let bytes = field.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 3 < bytes.len() {
            let digits = &bytes[i + 1..i + 4];
            if digits.iter().all(|b| (b'0'..=b'7').contains(b)) {
                let code = digits.iter().fold(0u32, |acc, b| acc * 8 + u32::from(b - b'0'));
                if let Ok(code) = u8::try_from(code) {
                    out.push(code);
                    i += 4;
                    continue;
                }
            }
        }
        out.push(bytes[i]);
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

fn is_pseudo_filesystem(fstype: &str) -> bool {
    let skip_types = [
        "proc",
        "sysfs",
        "devpts",
        "devtmpfs",
        "tmpfs",
        "cgroup",
        "cgroup2",
        "pstore",
        "bpf",
        "debugfs",
        "tracefs",
        "fusectl",
        "configfs",
        "securityfs",
        "hugetlbfs",
        "mqueue",
        "autofs",
        "binfmt_misc",
        "overlay",
        "squashfs",
        "nsfs",
        "rpc_pipefs",
    ];

    skip_types.contains(&fstype)
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOUNTS: &str = "\
/dev/sda1 / ext4 rw,relatime 0 0
proc /proc proc rw,nosuid,nodev,noexec,relatime 0 0
tmpfs /run tmpfs rw,nosuid,nodev 0 0
/dev/sdb1 /mnt/backup\\040disk xfs rw,relatime 0 0
/dev/mapper/vg-home /home btrfs rw 0 0
";

    const FILESYSTEMS: &str = "\
nodev\tsysfs
nodev\ttmpfs
nodev\tproc
\text4
\txfs
\tbtrfs
";

    #[test]
    fn test_parse_mounts() {
        let mounts = parse_mounts(MOUNTS);
        assert_eq!(mounts.len(), 5);
        assert_eq!(mounts[0].device, "/dev/sda1");
        assert_eq!(mounts[0].mountpoint, "/");
        assert_eq!(mounts[0].fstype, "ext4");
        assert_eq!(mounts[0].options, "rw,relatime");
        assert_eq!(mounts[3].mountpoint, "/mnt/backup disk");
    }

    #[test]
    fn test_unescape_mount_field() {
        assert_eq!(unescape_mount_field("/a\\040b"), "/a b");
        assert_eq!(unescape_mount_field("/a\\134b"), "/a\\b");
        assert_eq!(unescape_mount_field("/plain"), "/plain");
        assert_eq!(unescape_mount_field("/trailing\\04"), "/trailing\\04");
    }

    #[test]
    fn test_read_partitions_physical_only() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mounts"), MOUNTS).unwrap();
        fs::write(dir.path().join("filesystems"), FILESYSTEMS).unwrap();

        let parts = read_partitions(dir.path(), false).unwrap();
        let mountpoints: Vec<&str> = parts.iter().map(|p| p.mountpoint.as_str()).collect();
        assert_eq!(mountpoints, vec!["/", "/mnt/backup disk", "/home"]);

        let all = read_partitions(dir.path(), true).unwrap();
        assert_eq!(all.len(), 5);
    }

    #[test]
    fn test_read_partitions_static_fallback() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mounts"), MOUNTS).unwrap();

        let parts = read_partitions(dir.path(), false).unwrap();
        assert_eq!(parts.len(), 3);
        assert!(parts.iter().all(|p| p.fstype != "proc" && p.fstype != "tmpfs"));
    }

    #[test]
    fn test_read_partitions_missing_mount_table() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_partitions(dir.path(), false).unwrap_err();
        assert!(matches!(err, CollectorError::Enumeration(_)));
    }

    #[test]
    fn test_is_pseudo_filesystem() {
        assert!(is_pseudo_filesystem("proc"));
        assert!(is_pseudo_filesystem("tmpfs"));
        assert!(!is_pseudo_filesystem("ext4"));
        assert!(!is_pseudo_filesystem("xfs"));
    }
}
