//! Watch command handler.
//!
//! Subscribes to the live feed and charts samples until Ctrl-C or a
//! permanent failure.

use std::time::Duration;

use anyhow::Result;
use feedchart_core::{Dashboard, ListenerStats, StreamListener};
use feedchart_sse::{FeedSubscription, ReconnectPolicy};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::commands::WatchArgs;
use crate::error::CliError;
use crate::presentation::print_report;

/// Execute the watch command.
///
/// The subscription runs on this task and the listener on its own, joined by
/// a bounded channel. When the subscription returns, its sender is dropped,
/// the listener drains what is left and hands back the dashboard.
///
/// # Errors
///
/// Returns an error if the settings are invalid or the server rejects the
/// stream. The summary is printed either way.
pub async fn execute(args: &WatchArgs) -> Result<()> {
    let settings = args.settings()?;
    let url = settings.feed_url().map_err(CliError::from)?;
    let subscription = FeedSubscription::new(url, ReconnectPolicy::from_settings(&settings));

    let (tx, rx) = mpsc::channel(settings.effective_channel_capacity());
    let listener = StreamListener::new(Dashboard::new(settings.retention()));
    let stats = listener.subscribe_stats();
    let consumer = tokio::spawn(listener.run(rx));

    let cancel = CancellationToken::new();
    let interrupt = tokio::spawn(cancel_on_ctrl_c(cancel.clone()));
    let reporter = settings
        .effective_summary_interval()
        .map(|every| tokio::spawn(report_progress(stats, every, cancel.clone())));

    info!(url = %subscription.url(), "Watching feed");
    let outcome = subscription.run(tx, cancel.clone()).await;

    cancel.cancel();
    interrupt.abort();
    if let Some(reporter) = reporter {
        reporter.await.map_err(CliError::from)?;
    }
    let (dashboard, stats) = consumer.await.map_err(CliError::from)?;

    print_report(&dashboard, &stats, args.json)?;
    outcome.map_err(CliError::from)?;
    Ok(())
}

async fn cancel_on_ctrl_c(cancel: CancellationToken) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            info!("Interrupted, closing feed");
            cancel.cancel();
        }
        Err(e) => debug!(error = %e, "Ctrl-C handler unavailable"),
    }
}

/// Log the listener counters every `every` until cancelled.
async fn report_progress(
    stats: watch::Receiver<ListenerStats>,
    every: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let current = *stats.borrow();
                info!(
                    received = current.received,
                    ingested = current.ingested,
                    dropped = current.malformed + current.bad_timestamp,
                    series = current.series_created,
                    "Feed progress"
                );
            }
        }
    }
}
