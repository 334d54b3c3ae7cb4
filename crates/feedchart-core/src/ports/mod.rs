//! Port definitions (trait abstractions) for external systems.
//!
//! Ports use only domain types and carry no transport details.

pub mod chart_sink;

pub use chart_sink::{ChartError, ChartSink};
