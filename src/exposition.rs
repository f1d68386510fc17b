//! Text exposition of metric series.
//!
//! Each series is written as a block:
//!
//! ```text
//! # HELP disk_read_bytes [COUNTER] These values count ...
//! # TYPE disk_read_bytes COUNTER
//! disk_read_bytes{device="sda",mountpoint="/"} 1024
//!
//! ```
//!
//! The block always ends with a blank line, even when the series holds no
//! observations.

use std::io::{self, Write};

use crate::metrics::{MetricRegistry, MetricSeries, Tags};

/// Builds the `{k="v",...}` fragment for a tag set. Empty tag sets produce
/// an empty string.
pub fn format_tags(tags: &Tags) -> String {
    if tags.is_empty() {
        return String::new();
    }

    let pairs: Vec<String> = tags
        .iter()
        .map(|(key, value)| format!("{}=\"{}\"", key, escape_tag_value(value)))
        .collect();

    format!("{{{}}}", pairs.join(","))
}

fn escape_tag_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}

/// Formats a sample value using the shortest representation that parses
/// back to the same `f64`. Plain decimal is used for decimal exponents in
/// `[-4, 6)`, scientific notation (`1e+06`, `1.5e-05`) outside of it, the
/// same output as a shortest `%g` conversion.
pub fn format_value(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "+Inf" } else { "-Inf" }.to_string();
    }
    if value == 0.0 {
        return value.to_string();
    }

    let sci = format!("{:e}", value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => return value.to_string(),
    };

    if (-4..6).contains(&exponent) {
        value.to_string()
    } else {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    }
}

/// Formats a single observation line without the trailing newline.
pub fn format_sample(name: &str, tags: &Tags, value: f64) -> String {
    format!("{}{} {}", name, format_tags(tags), format_value(value))
}

/// Writes one series block.
pub fn write_series<W: Write>(out: &mut W, series: &MetricSeries) -> io::Result<()> {
    writeln!(
        out,
        "# HELP {} [{}] {}",
        series.name(),
        series.metric_type(),
        series.help()
    )?;
    writeln!(out, "# TYPE {} {}", series.name(), series.metric_type())?;

    for obs in series.observations() {
        writeln!(out, "{}", format_sample(series.name(), &obs.tags, obs.value))?;
    }

    writeln!(out)
}

/// Writes every series of the registry in name order.
pub fn write_registry<W: Write>(out: &mut W, registry: &MetricRegistry) -> io::Result<()> {
    for series in registry {
        write_series(out, series)?;
    }
    Ok(())
}

pub fn render_series(series: &MetricSeries) -> String {
    render_to_string(|buf| write_series(buf, series))
}

pub fn render_registry(registry: &MetricRegistry) -> String {
    render_to_string(|buf| write_registry(buf, registry))
}

fn render_to_string<F>(write: F) -> String
where
    F: FnOnce(&mut Vec<u8>) -> io::Result<()>,
{
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
