//! Configuration management for check-disk-io.
//!
//! This module handles loading, merging, and validating configuration from files
//! and CLI arguments. It supports YAML, JSON, and TOML formats.

use crate::cli::{Args, ConfigFormat, LogLevel};
use check_disk_io::collection::{TAG_DEVICE, TAG_MOUNTPOINT};
use check_disk_io::collectors::DEFAULT_SECTOR_SIZE;
use check_disk_io::{DeviceFilter, Tags};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use regex::Regex;

// Default configuration constants
pub const DEFAULT_PROC_ROOT: &str = "/proc";

/// Tag keys are emitted unquoted, so they are limited to identifier characters.
const TAG_KEY_PATTERN: &str = "^[A-Za-z_][A-Za-z0-9_]*$";

/// Effective check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    // Logging
    #[serde(alias = "log-level")]
    pub log_level: Option<String>,

    // Collection
    #[serde(alias = "proc-root")]
    pub proc_root: Option<PathBuf>,
    #[serde(alias = "all-partitions")]
    pub all_partitions: Option<bool>,
    #[serde(alias = "sector-size")]
    pub sector_size: Option<u64>,

    // Device filtering
    #[serde(alias = "include-devices")]
    pub include_devices: Option<Vec<String>>,
    #[serde(alias = "exclude-devices")]
    pub exclude_devices: Option<Vec<String>>,

    /// Static tags attached to every sample
    #[serde(alias = "extra-tags")]
    pub extra_tags: Option<BTreeMap<String, String>>,

    /// File the configuration was loaded from, if any
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("warn".into()),
            proc_root: Some(PathBuf::from(DEFAULT_PROC_ROOT)),
            all_partitions: Some(false),
            sector_size: Some(DEFAULT_SECTOR_SIZE),
            include_devices: None,
            exclude_devices: None,
            extra_tags: None,
            source_path: None,
        }
    }
}

impl Config {
    pub fn proc_root(&self) -> PathBuf {
        self.proc_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PROC_ROOT))
    }

    pub fn log_level(&self) -> LogLevel {
        self.log_level
            .as_deref()
            .and_then(|level| LogLevel::from_str(level, true).ok())
            .unwrap_or(LogLevel::Warn)
    }

    pub fn sector_size(&self) -> u64 {
        self.sector_size.unwrap_or(DEFAULT_SECTOR_SIZE)
    }

    pub fn device_filter(&self) -> Result<DeviceFilter, Box<dyn std::error::Error>> {
        let include = self.include_devices.clone().unwrap_or_default();
        let exclude = self.exclude_devices.clone().unwrap_or_default();
        Ok(DeviceFilter::new(&include, &exclude)?)
    }

    pub fn extra_tags(&self) -> Tags {
        self.extra_tags.clone().unwrap_or_default()
    }
}

/// Validate effective config (used by --check-config and at startup)
pub fn validate_effective_config(cfg: &Config) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = cfg.log_level.as_deref() {
        if LogLevel::from_str(level, true).is_err() {
            return Err(format!(
                "Invalid log_level '{}', expected off, error, warn, info, debug or trace",
                level
            )
            .into());
        }
    }

    if cfg.sector_size() == 0 {
        return Err("sector_size must be greater than 0".into());
    }

    cfg.device_filter()?;

    if let Some(tags) = &cfg.extra_tags {
        let key_pattern = Regex::new(TAG_KEY_PATTERN)?;
        for key in tags.keys() {
            if !key_pattern.is_match(key) {
                return Err(format!(
                    "extra_tags key '{}' is invalid, expected letters, digits and '_' not starting with a digit",
                    key
                )
                .into());
            }
            if key == TAG_DEVICE || key == TAG_MOUNTPOINT {
                return Err(format!(
                    "extra_tags key '{}' is reserved for per-device tags",
                    key
                )
                .into());
            }
        }
    }

    Ok(())
}

/// Splits comma-separated CLI lists.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Parses a `key=value` tag argument.
fn parse_tag(arg: &str) -> Result<(String, String), Box<dyn std::error::Error>> {
    match arg.split_once('=') {
        Some((key, value)) => Ok((key.trim().to_string(), value.to_string())),
        None => Err(format!("Invalid tag '{}', expected KEY=VALUE", arg).into()),
    }
}

/// Resolves configuration from CLI args, config file, and defaults.
/// This enforces precedence: CLI (if provided) > config file > default.
pub fn resolve_config(args: &Args) -> Result<Config, Box<dyn std::error::Error>> {
    let mut config = if args.no_config {
        Config::default()
    } else {
        load_config(args.config.as_deref())?
    };

    if let Some(level) = &args.log_level {
        config.log_level = Some(level.as_str().to_string());
    }
    if args.all_partitions {
        config.all_partitions = Some(true);
    }
    if let Some(proc_root) = &args.proc_root {
        config.proc_root = Some(proc_root.clone());
    }
    if let Some(sector_size) = args.sector_size {
        config.sector_size = Some(sector_size);
    }

    // Parse comma-separated include/exclude patterns
    if let Some(include_str) = &args.include_devices {
        config.include_devices = Some(split_list(include_str));
    }
    if let Some(exclude_str) = &args.exclude_devices {
        config.exclude_devices = Some(split_list(exclude_str));
    }

    // CLI tags are merged over file tags
    if !args.tags.is_empty() {
        let mut tags = config.extra_tags.take().unwrap_or_default();
        for arg in &args.tags {
            let (key, value) = parse_tag(arg)?;
            tags.insert(key, value);
        }
        config.extra_tags = Some(tags);
    }

    Ok(config)
}

/// Enhanced configuration loading with multiple format support
pub fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn std::error::Error>> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(format!("Config file not found: {}", p.display()).into());
            }
            p.to_path_buf()
        }
        None => {
            // Try default locations
            let defaults = [
                "/etc/sensu/check-disk-io.yaml",
                "/etc/sensu/check-disk-io.yml",
                "/etc/sensu/check-disk-io.json",
                "/etc/sensu/check-disk-io.toml",
                "./check-disk-io.yaml",
                "./check-disk-io.yml",
                "./check-disk-io.json",
                "./check-disk-io.toml",
            ];

            match defaults.iter().find(|p| Path::new(p).exists()) {
                Some(found) => PathBuf::from(found),
                None => return Ok(Config::default()),
            }
        }
    };

    let content = fs::read_to_string(&path)?;
    let mut config = parse_config(&content, &path)?;
    config.source_path = Some(path);
    Ok(config)
}

/// Parses configuration content, picking the format from the file extension.
fn parse_config(content: &str, path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("json") => serde_json::from_str(content)?,
        Some("toml") => toml::from_str(content)?,
        // Default to YAML
        _ => serde_yaml::from_str(content)?,
    };
    Ok(config)
}

/// Renders configuration in the requested format
pub fn format_config(
    config: &Config,
    format: &ConfigFormat,
) -> Result<String, Box<dyn std::error::Error>> {
    let output = match format {
        ConfigFormat::Json => serde_json::to_string_pretty(config)?,
        ConfigFormat::Toml => toml::to_string_pretty(config)?,
        ConfigFormat::Yaml => serde_yaml::to_string(config)?,
    };
    Ok(output)
}

/// Shows configuration in requested format
pub fn show_config(config: &Config, format: ConfigFormat) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", format_config(config, &format)?);
    Ok(())
}
