//! Incremental `text/event-stream` decoder.
//!
//! Bytes arrive in arbitrary chunks; the decoder buffers partial lines and
//! yields a [`FeedMessage`] each time a blank line dispatches an event.
//!
//! SSE format:
//!
//! ```text
//! id: 42
//! data: {"color":"red","cpu":1.5}
//!
//! ```

use std::time::Duration;

use bytes::{Buf, BytesMut};
use feedchart_core::domain::{DEFAULT_EVENT_TYPE, FeedMessage};
use tracing::trace;

const BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: BytesMut,
    /// Set once the start of the current stream has been checked for a BOM.
    bom_checked: bool,
    /// The previous line ended in `\r`; a following `\n` belongs to it.
    pending_cr: bool,
    data: String,
    event_type: String,
    /// Survives across events and reconnects.
    last_event_id: String,
    retry: Option<Duration>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and collect every event it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<FeedMessage> {
        self.buf.extend_from_slice(chunk);

        if !self.bom_checked {
            if self.buf.len() < BOM.len() && BOM.starts_with(&self.buf) {
                // Could still be a BOM; wait for more bytes.
                return Vec::new();
            }
            if self.buf.starts_with(BOM) {
                self.buf.advance(BOM.len());
            }
            self.bom_checked = true;
        }

        let mut events = Vec::new();
        loop {
            if self.pending_cr {
                let Some(&first) = self.buf.first() else {
                    break;
                };
                if first == b'\n' {
                    self.buf.advance(1);
                }
                self.pending_cr = false;
            }

            let Some(end) = self.buf.iter().position(|&b| b == b'\n' || b == b'\r') else {
                break;
            };
            let line = self.buf.split_to(end);
            if self.buf[0] == b'\r' {
                self.pending_cr = true;
            }
            self.buf.advance(1);

            let line = String::from_utf8_lossy(&line);
            if let Some(event) = self.process_line(&line) {
                events.push(event);
            }
        }
        events
    }

    fn process_line(&mut self, line: &str) -> Option<FeedMessage> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            trace!(comment = %line, "SSE comment");
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => value.clone_into(&mut self.event_type),
            "data" => {
                self.data.push_str(value);
                self.data.push('\n');
            }
            "id" => {
                if !value.contains('\0') {
                    value.clone_into(&mut self.last_event_id);
                }
            }
            "retry" => {
                if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
                    if let Ok(ms) = value.parse::<u64>() {
                        self.retry = Some(Duration::from_millis(ms));
                    }
                }
            }
            _ => trace!(field, "Ignoring unknown SSE field"),
        }
        None
    }

    fn dispatch(&mut self) -> Option<FeedMessage> {
        if self.data.is_empty() {
            self.event_type.clear();
            return None;
        }

        let mut data = std::mem::take(&mut self.data);
        if data.ends_with('\n') {
            data.pop();
        }
        let event_type = match std::mem::take(&mut self.event_type) {
            t if t.is_empty() => DEFAULT_EVENT_TYPE.to_string(),
            t => t,
        };

        Some(FeedMessage {
            event_type,
            data,
            last_event_id: self.last_event_id().map(str::to_string),
        })
    }

    /// Discard a partially received event and prepare for a new stream.
    ///
    /// The last event id and retry delay are kept.
    pub fn reset_stream(&mut self) {
        self.buf.clear();
        self.bom_checked = false;
        self.pending_cr = false;
        self.data.clear();
        self.event_type.clear();
    }

    pub fn last_event_id(&self) -> Option<&str> {
        if self.last_event_id.is_empty() {
            None
        } else {
            Some(&self.last_event_id)
        }
    }

    /// Retry delay announced by the server since the last call, if any.
    pub fn take_retry(&mut self) -> Option<Duration> {
        self.retry.take()
    }
}
