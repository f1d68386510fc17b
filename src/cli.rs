//! CLI arguments and subcommands for check-disk-io.
//!
//! This module defines the command-line interface structure using the clap library,
//! including all flags, options, and subcommands.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Log level options for CLI parsing
#[derive(Debug, Clone, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Off => "off",
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

/// Configuration format options for output
#[derive(Debug, Clone, ValueEnum)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

/// Main CLI arguments structure
#[derive(Parser, Debug)]
#[command(
    name = "check-disk-io",
    about = "Check disk IO and provide metrics",
    long_about = "Check disk IO and provide metrics.\n\n\
                  Reads per-device I/O counters for every mounted partition and prints them \
                  as HELP/TYPE annotated metric series on stdout. Diagnostics are logged to stderr.",
    version,
    propagate_version = true
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Log level, written to stderr [default: warn]
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,

    /// Config file (YAML/JSON/TOML)
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Disable all config file loading
    #[arg(long)]
    pub no_config: bool,

    /// Print effective merged config and exit
    #[arg(long)]
    pub show_config: bool,

    /// Output format for --show-config
    #[arg(long, value_enum, default_value = "yaml")]
    pub config_format: ConfigFormat,

    /// Validate config and exit (return code 3 on error)
    #[arg(long)]
    pub check_config: bool,

    /// Include pseudo, memory and duplicate filesystems
    #[arg(short = 'a', long)]
    pub all_partitions: bool,

    /// Root of the proc filesystem
    #[arg(long)]
    pub proc_root: Option<PathBuf>,

    /// Bytes per sector used to convert sector counts
    #[arg(long)]
    pub sector_size: Option<u64>,

    /// Include only devices matching these regexes (comma-separated)
    #[arg(long)]
    pub include_devices: Option<String>,

    /// Exclude devices matching these regexes (comma-separated)
    #[arg(long)]
    pub exclude_devices: Option<String>,

    /// Extra tag attached to every sample (key=value, repeatable)
    #[arg(short = 't', long = "tag", value_name = "KEY=VALUE")]
    pub tags: Vec<String>,
}

/// Subcommands for additional functionality
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate configuration files
    Config {
        /// Output file path ("-" for stdout)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: ConfigFormat,

        /// Include comments and examples
        #[arg(long)]
        commented: bool,
    },

    /// List the metric series reported by the check
    Catalog {
        /// Show help text for each series
        #[arg(long)]
        verbose: bool,
    },
}
