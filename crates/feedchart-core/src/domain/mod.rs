//! Domain types: samples, series, charts and feed messages.
//!
//! These are pure types with no transport dependencies.

mod category;
mod chart;
mod dashboard;
mod feed;
mod sample;
mod series;
pub mod timestamp;

pub use category::{Category, Metric};
pub use chart::{Chart, ChartSummary, SeriesRegistry, SeriesSummary};
pub use dashboard::{Dashboard, DashboardSummary};
pub use feed::{DEFAULT_EVENT_TYPE, FeedMessage};
pub use sample::{Sample, SampleError};
pub use series::{Point, RetentionPolicy, TimeSeries};
pub use timestamp::{TimestampError, parse_timestamp};
