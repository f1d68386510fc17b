//! Catalog command implementation.
//!
//! Lists the metric series reported by the check.

use check_disk_io::{MetricType, DISK_METRICS};

/// Lists every metric series with its type.
pub fn command_catalog(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("📊 check-disk-io - Metric Series");
    println!("================================");

    for def in DISK_METRICS.iter() {
        println!("\n   ├─ {} [{}]", def.name, def.metric_type);
        if verbose {
            println!("   │  └─ {}", def.help);
        }
    }

    let gauges = DISK_METRICS
        .iter()
        .filter(|d| d.metric_type == MetricType::Gauge)
        .count();

    println!(
        "\n📋 Total: {} series ({} counters, {} gauges)",
        DISK_METRICS.len(),
        DISK_METRICS.len() - gauges,
        gauges
    );

    Ok(())
}
