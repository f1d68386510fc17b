//! Config command implementation.
//!
//! Generates configuration files in various formats.

use std::fs;
use std::path::PathBuf;

use crate::cli::ConfigFormat;
use crate::config::{format_config, Config};

/// Generates configuration files.
pub fn command_config(
    output: Option<PathBuf>,
    format: ConfigFormat,
    commented: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    let output = match output {
        Some(path) => path,
        None => PathBuf::from("check-disk-io.yaml"),
    };

    let mut content = format_config(&config, &format)?;
    if commented && matches!(format, ConfigFormat::Yaml) {
        content = add_config_comments(content);
    }

    if output.to_string_lossy() == "-" {
        print!("{}", content);
    } else {
        fs::write(&output, content)?;
        println!("✅ Configuration written to: {}", output.display());
    }

    Ok(())
}

/// Adds comments to YAML configuration.
fn add_config_comments(yaml: String) -> String {
    let comments = r#"# check-disk-io Configuration
# ============================
#
# Logging
# -------
# log_level: "warn"            # off, error, warn, info, debug, trace (stderr)
#
# Collection
# ----------
# proc_root: "/proc"           # Root of the proc filesystem
# all_partitions: false        # Include pseudo/memory filesystems
# sector_size: 512             # Bytes per diskstats sector
#
# Device Filtering
# ----------------
# include_devices: null        # Regexes, e.g. ["^sd", "^nvme"]
# exclude_devices: null        # Regexes, e.g. ["^loop", "^dm-"]
#
# Tags
# ----
# extra_tags: null             # Attached to every sample, e.g. {host: "db01"}
"#;

    format!("{comments}\n{yaml}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_config_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.yaml");

        command_config(Some(path.clone()), ConfigFormat::Yaml, true).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("# check-disk-io Configuration"));
        let parsed: Config = serde_yaml::from_str(&content).unwrap();
        assert_eq!(parsed.sector_size, Some(512));
    }
}
