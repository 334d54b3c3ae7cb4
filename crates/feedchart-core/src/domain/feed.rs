//! Messages handed from the transport to the listener.

use serde::{Deserialize, Serialize};

/// Event type delivered to `onmessage`-style consumers.
pub const DEFAULT_EVENT_TYPE: &str = "message";

/// One dispatched server-sent event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedMessage {
    /// SSE event type; `message` unless the server set `event:`.
    pub event_type: String,
    /// Payload, with multi-line `data:` fields joined by `\n`.
    pub data: String,
    /// Last event id in effect when this event was dispatched.
    pub last_event_id: Option<String>,
}

impl FeedMessage {
    /// A plain `message` event carrying `data`.
    pub fn message(data: impl Into<String>) -> Self {
        Self {
            event_type: DEFAULT_EVENT_TYPE.to_string(),
            data: data.into(),
            last_event_id: None,
        }
    }

    pub fn is_message(&self) -> bool {
        self.event_type == DEFAULT_EVENT_TYPE
    }
}
