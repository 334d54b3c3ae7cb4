//! Transport errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SseError {
    /// Network failure or broken stream. Retried.
    #[error("Feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with something other than an event stream.
    /// Not retried.
    #[error("Feed rejected by {url}: {reason}")]
    Rejected { url: String, reason: String },
}

impl SseError {
    /// Whether a reconnect attempt should follow this error.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Http(_))
    }
}
