//! CLI command implementations for check-disk-io.
//!
//! This module provides implementations for the CLI subcommands:
//! - `config`: Configuration file generation
//! - `catalog`: Metric series listing

pub mod catalog;
pub mod config;

// Re-export command functions
pub use catalog::command_catalog;
pub use config::command_config;
