//! Table formatting for run summaries.

use chrono::{DateTime, SecondsFormat, Utc};
use feedchart_core::SeriesSummary;

use super::Report;

const WIDTH: usize = 97;

/// Print a horizontal separator line.
pub fn print_separator(width: usize) {
    println!("{}", "-".repeat(width));
}

/// Format an optional value for table display, returning a default if None.
pub fn format_optional<T: std::fmt::Display>(value: Option<T>, default: &str) -> String {
    value.map_or_else(|| default.to_string(), |v| v.to_string())
}

/// Two decimals, or `--` when the series has no value yet.
pub fn format_value(value: Option<f64>) -> String {
    value.map_or_else(|| "--".to_string(), |v| format!("{v:.2}"))
}

fn format_instant(at: Option<DateTime<Utc>>) -> String {
    format_optional(at.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true)), "--")
}

/// Print the counters, then one table per chart.
pub fn print_summary(report: &Report<'_>) {
    let stats = report.stats;
    println!(
        "Received {} message(s): {} ingested, {} ignored, {} malformed, {} bad timestamp, {} sink error(s)",
        stats.received,
        stats.ingested,
        stats.ignored,
        stats.malformed,
        stats.bad_timestamp,
        stats.sink_errors
    );

    for chart in &report.charts {
        println!();
        println!("{} ({} series)", chart.metric, chart.series.len());
        if chart.series.is_empty() {
            println!("  No samples received.");
            continue;
        }

        println!(
            "{:<12} {:>7} {:<21} {:<21} {:>10} {:>10} {:>10}",
            "Category", "Points", "First", "Last", "Last value", "Min", "Max"
        );
        print_separator(WIDTH);
        for series in &chart.series {
            println!("{}", format_series_row(series));
        }
    }
}

/// One table row for a series.
pub fn format_series_row(series: &SeriesSummary) -> String {
    format!(
        "{:<12} {:>7} {:<21} {:<21} {:>10} {:>10} {:>10}",
        series.category.as_str(),
        series.points,
        format_instant(series.first_at),
        format_instant(series.last_at),
        format_value(series.last_value),
        format_value(series.min_value),
        format_value(series.max_value)
    )
}
