//! check-disk-io - version 0.1.0
//!
//! Disk I/O metrics check with tracing logging.
//! This is the main entry point that resolves configuration, handles subcommands
//! and runs the collection pass.

mod cli;
mod commands;
mod config;

use clap::Parser;
use std::io;
use tracing::{debug, info, Level};

use check_disk_io::{run_check, CheckState, ProcDiskSource, PLUGIN_NAME};
use cli::{Args, Commands, LogLevel};
use commands::{command_catalog, command_config};
use config::{resolve_config, show_config, validate_effective_config, Config};

/// Initializes tracing logging subsystem with configured log level.
/// Logs go to stderr; stdout carries only the metrics report.
fn setup_logging(config: &Config) {
    let level = config.log_level();
    let log_level = match level {
        LogLevel::Off => return,
        LogLevel::Error => Level::ERROR,
        LogLevel::Warn => Level::WARN,
        LogLevel::Info => Level::INFO,
        LogLevel::Debug => Level::DEBUG,
        LogLevel::Trace => Level::TRACE,
    };

    let subscriber = tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return;
    }

    debug!("Logging initialized with level: {:?}", level);
}

/// Runs the requested mode and returns the check state to exit with.
fn run(args: Args) -> Result<CheckState, Box<dyn std::error::Error>> {
    if let Some(Commands::Config {
        output,
        format,
        commented,
    }) = &args.command
    {
        command_config(output.clone(), format.clone(), *commented)?;
        return Ok(CheckState::Ok);
    }

    let config = resolve_config(&args)?;
    validate_effective_config(&config)?;

    if args.check_config {
        println!("✅ Configuration is valid");
        return Ok(CheckState::Ok);
    }

    if args.show_config {
        show_config(&config, args.config_format)?;
        return Ok(CheckState::Ok);
    }

    if let Some(Commands::Catalog { verbose }) = &args.command {
        command_catalog(*verbose)?;
        return Ok(CheckState::Ok);
    }

    setup_logging(&config);
    info!("Starting {}", PLUGIN_NAME);
    match &config.source_path {
        Some(path) => info!("Loaded configuration from: {}", path.display()),
        None => debug!("No configuration file loaded, using defaults"),
    }

    let source = ProcDiskSource::new(
        config.proc_root(),
        config.all_partitions.unwrap_or(false),
        config.sector_size(),
    );
    let filter = config.device_filter()?;
    let extra_tags = config.extra_tags();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let (state, report) = run_check(&source, &filter, &extra_tags, &mut out)?;

    info!(
        "{} finished: {} ({} devices recorded, {} failures)",
        PLUGIN_NAME, state, report.recorded, report.failures
    );
    Ok(state)
}

/// Main application entry point.
fn main() {
    let args = Args::parse();

    let state = match run(args) {
        Ok(state) => state,
        Err(e) => {
            eprintln!("❌ {}: {}", PLUGIN_NAME, e);
            CheckState::Unknown
        }
    };

    std::process::exit(state.exit_code());
}
