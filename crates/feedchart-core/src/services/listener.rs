//! The stream listener: a single consumer that turns feed messages into
//! chart points.
//!
//! Messages are taken from an `mpsc` channel one at a time and each is
//! handled to completion before the next is received. Handling never awaits.
//!
//! Bad input is dropped and logged:
//!
//! - payloads that are not a valid sample count as `malformed`
//! - samples whose timestamp cannot be parsed count as `bad_timestamp` and
//!   create no series
//! - events whose type is not `message` are ignored

use serde::Serialize;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

use crate::domain::{FeedMessage, Metric, Sample};
use crate::ports::ChartSink;

/// Running counters for a listener.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListenerStats {
    /// Messages taken off the channel.
    pub received: u64,
    /// Samples appended to every chart.
    pub ingested: u64,
    /// Non-`message` events skipped.
    pub ignored: u64,
    /// Payloads that did not decode to a sample.
    pub malformed: u64,
    /// Samples dropped for an unparseable timestamp.
    pub bad_timestamp: u64,
    /// Appends rejected by the sink.
    pub sink_errors: u64,
    /// Series created across all charts.
    pub series_created: u64,
}

/// What happened to a single message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Appended to every chart; `created` series were new.
    Ingested { created: usize },
    Ignored,
    Malformed,
    BadTimestamp,
    /// At least one append failed.
    SinkError,
}

/// Consumer that feeds samples into a [`ChartSink`].
pub struct StreamListener<S> {
    sink: S,
    stats: ListenerStats,
    stats_tx: watch::Sender<ListenerStats>,
}

impl<S: ChartSink> StreamListener<S> {
    pub fn new(sink: S) -> Self {
        let (stats_tx, _) = watch::channel(ListenerStats::default());
        Self {
            sink,
            stats: ListenerStats::default(),
            stats_tx,
        }
    }

    pub const fn stats(&self) -> &ListenerStats {
        &self.stats
    }

    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// Watch the counters while the listener runs on another task.
    pub fn subscribe_stats(&self) -> watch::Receiver<ListenerStats> {
        self.stats_tx.subscribe()
    }

    /// Handle one message to completion.
    pub fn handle(&mut self, message: &FeedMessage) -> Outcome {
        self.stats.received += 1;
        let outcome = self.process(message);

        match outcome {
            Outcome::Ingested { created } => {
                self.stats.ingested += 1;
                self.stats.series_created += created as u64;
            }
            Outcome::Ignored => self.stats.ignored += 1,
            Outcome::Malformed => self.stats.malformed += 1,
            Outcome::BadTimestamp => self.stats.bad_timestamp += 1,
            Outcome::SinkError => self.stats.sink_errors += 1,
        }

        self.stats_tx.send_replace(self.stats);
        outcome
    }

    fn process(&mut self, message: &FeedMessage) -> Outcome {
        if !message.is_message() {
            debug!(event_type = %message.event_type, "Ignoring non-message event");
            return Outcome::Ignored;
        }

        let sample = match Sample::decode(&message.data) {
            Ok(sample) => sample,
            Err(e) => {
                warn!(error = %e, payload = %message.data, "Dropping malformed sample");
                return Outcome::Malformed;
            }
        };

        // Parse before touching the registries so a rejected sample leaves no series behind.
        let at = match sample.instant() {
            Ok(at) => at,
            Err(e) => {
                warn!(category = %sample.category, error = %e, "Dropping sample with bad timestamp");
                return Outcome::BadTimestamp;
            }
        };

        let mut created = 0;
        for metric in Metric::ALL {
            if !self.sink.has_series(metric, &sample.category) {
                self.sink.add_series(metric, &sample.category);
                created += 1;
                info!(%metric, category = %sample.category, "Created series");
            }
        }

        let mut failed = false;
        for metric in Metric::ALL {
            if let Err(e) = self
                .sink
                .append(metric, &sample.category, at, sample.value(metric))
            {
                error!(%metric, category = %sample.category, error = %e, "Chart append failed");
                failed = true;
            }
        }

        if failed {
            return Outcome::SinkError;
        }

        debug!(
            category = %sample.category,
            %at,
            cpu = sample.cpu,
            mem = sample.mem,
            "Ingested sample"
        );
        Outcome::Ingested { created }
    }

    /// Consume messages until every sender is dropped.
    ///
    /// Returns the sink and the final counters.
    pub async fn run(mut self, mut messages: mpsc::Receiver<FeedMessage>) -> (S, ListenerStats) {
        debug!("Stream listener started");
        while let Some(message) = messages.recv().await {
            self.handle(&message);
        }
        debug!(stats = ?self.stats, "Stream listener finished");
        self.into_parts()
    }

    pub fn into_parts(self) -> (S, ListenerStats) {
        (self.sink, self.stats)
    }
}
