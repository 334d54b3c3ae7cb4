//! Incoming sample records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::category::{Category, Metric};
use super::timestamp::{TimestampError, parse_timestamp};

/// Errors raised while decoding a feed payload.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("Malformed sample payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// One record delivered by the feed.
///
/// Wire format:
///
/// ```json
/// {"color": "red", "timestamp": "2019-07-27T10:19:07.123456+00:00", "cpu": 12.5, "mem": 48.1}
/// ```
///
/// Extra fields are ignored. The timestamp stays as text until
/// [`Sample::instant`] is called so that a bad timestamp can be reported
/// separately from a bad payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(rename = "color")]
    pub category: Category,
    pub timestamp: String,
    pub cpu: f64,
    pub mem: f64,
}

impl Sample {
    /// Decode a JSON payload.
    pub fn decode(payload: &str) -> Result<Self, SampleError> {
        Ok(serde_json::from_str(payload)?)
    }

    /// Parse the timestamp into an absolute instant.
    pub fn instant(&self) -> Result<DateTime<Utc>, TimestampError> {
        parse_timestamp(&self.timestamp)
    }

    /// Value for the given metric.
    pub const fn value(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Cpu => self.cpu,
            Metric::Mem => self.mem,
        }
    }
}
