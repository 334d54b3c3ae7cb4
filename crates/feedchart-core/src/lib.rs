//! Core of feedchart: sample decoding, the in-memory charting layer and the
//! stream listener that connects the two.
//!
//! Transport crates deliver [`FeedMessage`]s on a channel; a
//! [`StreamListener`] consumes them and drives a [`ChartSink`], normally the
//! [`Dashboard`].

#![deny(unused_crate_dependencies)]

pub mod domain;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export commonly used types for convenience
pub use domain::{
    Category, Chart, ChartSummary, Dashboard, DashboardSummary, FeedMessage, Metric, Point,
    RetentionPolicy, Sample, SampleError, SeriesRegistry, SeriesSummary, TimeSeries,
    TimestampError, parse_timestamp,
};
pub use ports::{ChartError, ChartSink};
pub use services::{ListenerStats, Outcome, StreamListener};
pub use settings::{
    DEFAULT_BASE_URL, DEFAULT_FEED_PATH, DEFAULT_RETRY_MS, Settings, SettingsError,
    SettingsUpdate, validate_settings,
};

// mockall is only used by integration tests
#[cfg(test)]
use mockall as _;
