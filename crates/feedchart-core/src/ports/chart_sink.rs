//! Charting API consumed by the stream listener.
//!
//! The listener never owns series. It asks the sink whether a series exists,
//! asks it to create one, and appends points to it. The in-process
//! implementation is [`crate::domain::Dashboard`].

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{Category, Metric};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("No {metric} series for category '{category}'")]
    UnknownSeries { metric: Metric, category: Category },

    #[error("Chart backend error: {0}")]
    Backend(String),
}

/// Charting subsystem as seen from the listener.
///
/// Calls arrive from a single consumer task, one sample at a time.
pub trait ChartSink: Send {
    /// Whether `metric`'s chart already has a series for `category`.
    fn has_series(&self, metric: Metric, category: &Category) -> bool;

    /// Create a series for `category` on `metric`'s chart.
    ///
    /// Creating a series that already exists must leave it untouched.
    fn add_series(&mut self, metric: Metric, category: &Category);

    /// Append a point to an existing series.
    fn append(
        &mut self,
        metric: Metric,
        category: &Category,
        at: DateTime<Utc>,
        value: f64,
    ) -> Result<(), ChartError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_series_message() {
        let err = ChartError::UnknownSeries {
            metric: Metric::Mem,
            category: Category::from("red"),
        };
        assert_eq!(err.to_string(), "No mem series for category 'red'");
    }
}
