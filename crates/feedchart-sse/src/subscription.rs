//! Long-lived subscription to the feed endpoint.
//!
//! Behaves like a browser `EventSource`:
//!
//! - network errors and stream ends are followed by a reconnect after the
//!   current delay, sending `Last-Event-ID` when one is known
//! - a response that is not `200 text/event-stream` fails permanently
//! - the ready state moves between `Connecting`, `Open` and `Closed`
//!
//! Decoded events are sent, in order, on an `mpsc` channel to a single
//! consumer.

use std::fmt;

use feedchart_core::FeedMessage;
use futures_util::StreamExt;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE},
};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::decoder::SseDecoder;
use crate::error::SseError;
use crate::reconnect::{Backoff, ReconnectPolicy};

const EVENT_STREAM: &str = "text/event-stream";
const LAST_EVENT_ID: &str = "Last-Event-ID";

/// Connection state, as exposed by `EventSource.readyState`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Connecting,
    Open,
    Closed,
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Connecting => "connecting",
            Self::Open => "open",
            Self::Closed => "closed",
        })
    }
}

/// How a single connection ended.
enum StreamEnd {
    /// Stream finished or broke; reconnect.
    Dropped,
    /// Cancelled or the consumer went away; stop.
    Stop,
}

pub struct FeedSubscription {
    client: Client,
    url: Url,
    policy: ReconnectPolicy,
    state_tx: watch::Sender<ReadyState>,
}

impl FeedSubscription {
    pub fn new(url: Url, policy: ReconnectPolicy) -> Self {
        Self::with_client(Client::new(), url, policy)
    }

    pub fn with_client(client: Client, url: Url, policy: ReconnectPolicy) -> Self {
        let (state_tx, _) = watch::channel(ReadyState::Connecting);
        Self {
            client,
            url,
            policy,
            state_tx,
        }
    }

    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Observe ready state transitions.
    pub fn ready_state(&self) -> watch::Receiver<ReadyState> {
        self.state_tx.subscribe()
    }

    fn set_state(&self, state: ReadyState) {
        let previous = self.state_tx.send_replace(state);
        if previous != state {
            debug!(url = %self.url, from = %previous, to = %state, "Feed ready state changed");
        }
    }

    /// Subscribe and forward events until cancelled, the receiver is dropped,
    /// or the server rejects the stream.
    pub async fn run(
        &self,
        sender: mpsc::Sender<FeedMessage>,
        cancel: CancellationToken,
    ) -> Result<(), SseError> {
        let mut decoder = SseDecoder::new();
        let mut backoff = Backoff::new(self.policy);

        loop {
            self.set_state(ReadyState::Connecting);

            let attempt = tokio::select! {
                () = cancel.cancelled() => break,
                attempt = self.connect(decoder.last_event_id()) => attempt,
            };

            match attempt {
                Ok(response) => {
                    self.set_state(ReadyState::Open);
                    info!(url = %self.url, "Feed connected");
                    backoff.reset();
                    decoder.reset_stream();

                    let end = self
                        .pump(response, &mut decoder, &mut backoff, &sender, &cancel)
                        .await;
                    if matches!(end, StreamEnd::Stop) {
                        break;
                    }
                }
                Err(e) if e.is_retryable() => {
                    warn!(url = %self.url, error = %e, "Feed connection failed");
                }
                Err(e) => {
                    error!(url = %self.url, error = %e, "Feed failed permanently");
                    self.set_state(ReadyState::Closed);
                    return Err(e);
                }
            }

            if sender.is_closed() {
                break;
            }

            let delay = backoff.next_delay();
            self.set_state(ReadyState::Connecting);
            warn!(
                url = %self.url,
                delay_ms = millis(delay),
                "Reconnecting to feed"
            );
            tokio::select! {
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
        }

        self.set_state(ReadyState::Closed);
        debug!(url = %self.url, "Feed subscription closed");
        Ok(())
    }

    async fn connect(&self, last_event_id: Option<&str>) -> Result<Response, SseError> {
        let mut request = self
            .client
            .get(self.url.clone())
            .header(ACCEPT, EVENT_STREAM)
            .header(CACHE_CONTROL, "no-cache");
        if let Some(id) = last_event_id {
            request = request.header(LAST_EVENT_ID, id);
        }

        let response = request.send().await?;
        self.check_response(&response)?;
        Ok(response)
    }

    fn check_response(&self, response: &Response) -> Result<(), SseError> {
        let status = response.status();
        if status != StatusCode::OK {
            return Err(self.rejected(format!("unexpected status {status}")));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        if !is_event_stream(content_type) {
            return Err(self.rejected(format!("unexpected content type {content_type:?}")));
        }
        Ok(())
    }

    fn rejected(&self, reason: String) -> SseError {
        SseError::Rejected {
            url: self.url.to_string(),
            reason,
        }
    }

    /// Read one connection to its end, forwarding every decoded event.
    async fn pump(
        &self,
        response: Response,
        decoder: &mut SseDecoder,
        backoff: &mut Backoff,
        sender: &mpsc::Sender<FeedMessage>,
        cancel: &CancellationToken,
    ) -> StreamEnd {
        let mut stream = response.bytes_stream();

        loop {
            let next = tokio::select! {
                () = cancel.cancelled() => return StreamEnd::Stop,
                next = stream.next() => next,
            };

            match next {
                Some(Ok(chunk)) => {
                    for message in decoder.feed(&chunk) {
                        let sent = tokio::select! {
                            () = cancel.cancelled() => return StreamEnd::Stop,
                            sent = sender.send(message) => sent,
                        };
                        if sent.is_err() {
                            debug!("Feed consumer dropped, stopping subscription");
                            return StreamEnd::Stop;
                        }
                    }
                    if let Some(retry) = decoder.take_retry() {
                        debug!(retry_ms = millis(retry), "Server set reconnection delay");
                        backoff.set_base(retry);
                    }
                }
                Some(Err(e)) => {
                    warn!(url = %self.url, error = %e, "Feed stream broke");
                    return StreamEnd::Dropped;
                }
                None => {
                    info!(url = %self.url, "Feed stream ended");
                    return StreamEnd::Dropped;
                }
            }
        }
    }
}

fn millis(duration: std::time::Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

fn is_event_stream(content_type: &str) -> bool {
    content_type
        .split(';')
        .next()
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case(EVENT_STREAM))
}
