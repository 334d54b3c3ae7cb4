//! Terminal output for summaries.
//!
//! Format-only: figures come from the core summaries, this module only
//! lays them out.

pub mod tables;

use feedchart_core::{ChartSummary, Dashboard, ListenerStats};
use serde::Serialize;

use crate::error::CliError;

pub use tables::{
    format_optional, format_series_row, format_value, print_separator, print_summary,
};

/// Everything printed at the end of a run.
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub stats: &'a ListenerStats,
    pub charts: Vec<ChartSummary>,
}

impl<'a> Report<'a> {
    pub fn new(dashboard: &Dashboard, stats: &'a ListenerStats) -> Self {
        Self {
            stats,
            charts: dashboard.summary().charts,
        }
    }
}

/// Print the report to stdout, as a table or as pretty JSON.
///
/// # Errors
///
/// Returns an error if the report cannot be serialized.
pub fn print_report(
    dashboard: &Dashboard,
    stats: &ListenerStats,
    json: bool,
) -> Result<(), CliError> {
    let report = Report::new(dashboard, stats);
    if json {
        let out = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::Internal(format!("cannot serialize summary: {e}")))?;
        println!("{out}");
    } else {
        print_summary(&report);
    }
    Ok(())
}
