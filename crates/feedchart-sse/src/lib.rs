//! Server-sent event transport for feedchart.
//!
//! [`FeedSubscription`] keeps a long-lived `GET` open against the feed
//! endpoint, decodes the `text/event-stream` body with [`SseDecoder`], and
//! hands each event to the stream listener over an `mpsc` channel.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

pub mod decoder;
pub mod error;
pub mod reconnect;
pub mod subscription;

pub use decoder::SseDecoder;
pub use error::SseError;
pub use reconnect::{Backoff, ReconnectPolicy};
pub use subscription::{FeedSubscription, ReadyState};

// Used by integration tests only
#[cfg(test)]
use axum as _;
