//! Settings domain types and validation.
//!
//! All fields are optional so that CLI flags, environment variables and
//! defaults can be layered with [`Settings::merge`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::RetentionPolicy;

/// Default address of the feed server.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8088";

/// Default path of the event stream.
pub const DEFAULT_FEED_PATH: &str = "/feed";

/// Default reconnection delay, matching common EventSource implementations.
pub const DEFAULT_RETRY_MS: u64 = 3000;

/// Default upper bound on the reconnection delay when backing off.
pub const DEFAULT_MAX_RETRY_MS: u64 = 30_000;

/// Default capacity of the transport-to-listener channel.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default interval between progress summaries.
pub const DEFAULT_SUMMARY_INTERVAL_SECS: u64 = 10;

const MAX_CHANNEL_CAPACITY: usize = 65_536;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the feed server (scheme, host and port).
    pub base_url: Option<String>,

    /// Path of the event stream on the server.
    pub feed_path: Option<String>,

    /// Initial reconnection delay in milliseconds.
    pub retry_ms: Option<u64>,

    /// Upper bound on the reconnection delay in milliseconds.
    pub max_retry_ms: Option<u64>,

    /// Multiplier applied to the delay after each consecutive failure.
    /// `1.0` keeps a constant delay.
    pub backoff_factor: Option<f64>,

    /// Capacity of the channel between transport and listener.
    pub channel_capacity: Option<usize>,

    /// Maximum points kept per series.
    pub max_points: Option<usize>,

    /// Maximum age of points kept per series, relative to the newest point.
    pub max_age_secs: Option<u64>,

    /// Seconds between progress summaries; `0` disables them.
    pub summary_interval_secs: Option<u64>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            base_url: Some(DEFAULT_BASE_URL.to_string()),
            feed_path: Some(DEFAULT_FEED_PATH.to_string()),
            retry_ms: Some(DEFAULT_RETRY_MS),
            max_retry_ms: Some(DEFAULT_MAX_RETRY_MS),
            backoff_factor: Some(1.0),
            channel_capacity: Some(DEFAULT_CHANNEL_CAPACITY),
            max_points: None,
            max_age_secs: None,
            summary_interval_secs: Some(DEFAULT_SUMMARY_INTERVAL_SECS),
        }
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn effective_feed_path(&self) -> &str {
        self.feed_path.as_deref().unwrap_or(DEFAULT_FEED_PATH)
    }

    pub fn effective_retry(&self) -> Duration {
        Duration::from_millis(self.retry_ms.unwrap_or(DEFAULT_RETRY_MS))
    }

    pub fn effective_max_retry(&self) -> Duration {
        Duration::from_millis(self.max_retry_ms.unwrap_or(DEFAULT_MAX_RETRY_MS))
    }

    pub fn effective_backoff_factor(&self) -> f64 {
        self.backoff_factor.unwrap_or(1.0)
    }

    pub fn effective_channel_capacity(&self) -> usize {
        self.channel_capacity.unwrap_or(DEFAULT_CHANNEL_CAPACITY)
    }

    /// `None` when summaries are disabled.
    pub fn effective_summary_interval(&self) -> Option<Duration> {
        match self
            .summary_interval_secs
            .unwrap_or(DEFAULT_SUMMARY_INTERVAL_SECS)
        {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    pub fn retention(&self) -> RetentionPolicy {
        RetentionPolicy {
            max_age: self.max_age_secs.map(Duration::from_secs),
            max_points: self.max_points,
        }
    }

    /// Full URL of the event stream.
    pub fn feed_url(&self) -> Result<Url, SettingsError> {
        let base = parse_base_url(self.effective_base_url())?;
        base.join(self.effective_feed_path())
            .map_err(|e| SettingsError::InvalidUrl(e.to_string()))
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref url) = other.base_url {
            self.base_url.clone_from(url);
        }
        if let Some(ref path) = other.feed_path {
            self.feed_path.clone_from(path);
        }
        if let Some(ref retry) = other.retry_ms {
            self.retry_ms = *retry;
        }
        if let Some(ref max_retry) = other.max_retry_ms {
            self.max_retry_ms = *max_retry;
        }
        if let Some(ref factor) = other.backoff_factor {
            self.backoff_factor = *factor;
        }
        if let Some(ref capacity) = other.channel_capacity {
            self.channel_capacity = *capacity;
        }
        if let Some(ref points) = other.max_points {
            self.max_points = *points;
        }
        if let Some(ref age) = other.max_age_secs {
            self.max_age_secs = *age;
        }
        if let Some(ref interval) = other.summary_interval_secs {
            self.summary_interval_secs = *interval;
        }
    }
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub base_url: Option<Option<String>>,
    pub feed_path: Option<Option<String>>,
    pub retry_ms: Option<Option<u64>>,
    pub max_retry_ms: Option<Option<u64>>,
    pub backoff_factor: Option<Option<f64>>,
    pub channel_capacity: Option<Option<usize>>,
    pub max_points: Option<Option<usize>>,
    pub max_age_secs: Option<Option<u64>>,
    pub summary_interval_secs: Option<Option<u64>>,
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("Invalid base URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("Feed path must start with '/', got {0:?}")]
    InvalidFeedPath(String),

    #[error("Retry delay must be at least 1ms")]
    InvalidRetry,

    #[error("Maximum retry delay ({max_ms}ms) must be >= retry delay ({retry_ms}ms)")]
    InvalidMaxRetry { retry_ms: u64, max_ms: u64 },

    #[error("Backoff factor must be a finite number >= 1.0, got {0}")]
    InvalidBackoffFactor(f64),

    #[error("Channel capacity must be between 1 and 65536, got {0}")]
    InvalidChannelCapacity(usize),

    #[error("Max points must be at least 1")]
    InvalidMaxPoints,
}

fn parse_base_url(raw: &str) -> Result<Url, SettingsError> {
    let url = Url::parse(raw).map_err(|e| SettingsError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SettingsError::UnsupportedScheme(other.to_string())),
    }
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    if let Some(ref url) = settings.base_url {
        parse_base_url(url)?;
    }

    if let Some(ref path) = settings.feed_path {
        if !path.starts_with('/') {
            return Err(SettingsError::InvalidFeedPath(path.clone()));
        }
    }

    if settings.retry_ms == Some(0) {
        return Err(SettingsError::InvalidRetry);
    }

    let retry_ms = settings.retry_ms.unwrap_or(DEFAULT_RETRY_MS);
    if let Some(max_ms) = settings.max_retry_ms {
        if max_ms < retry_ms {
            return Err(SettingsError::InvalidMaxRetry { retry_ms, max_ms });
        }
    }

    if let Some(factor) = settings.backoff_factor {
        if !factor.is_finite() || factor < 1.0 {
            return Err(SettingsError::InvalidBackoffFactor(factor));
        }
    }

    if let Some(capacity) = settings.channel_capacity {
        if !(1..=MAX_CHANNEL_CAPACITY).contains(&capacity) {
            return Err(SettingsError::InvalidChannelCapacity(capacity));
        }
    }

    if settings.max_points == Some(0) {
        return Err(SettingsError::InvalidMaxPoints);
    }

    Ok(())
}
