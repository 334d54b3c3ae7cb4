//! Replay command handler.
//!
//! Reads a file with one JSON payload per line and runs it through the same
//! listener the live feed uses. Blank lines are skipped; everything else is
//! handed over, so bad lines (including invalid UTF-8) are counted rather
//! than fatal.

use anyhow::Result;
use feedchart_core::{Dashboard, FeedMessage, ListenerStats, RetentionPolicy, StreamListener};
use tokio::fs::File;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::info;

use crate::commands::ReplayArgs;
use crate::error::CliError;
use crate::presentation::print_report;

/// Execute the replay command.
///
/// # Errors
///
/// Returns an error if the settings are invalid or the file cannot be read.
pub async fn execute(args: &ReplayArgs) -> Result<()> {
    let settings = args.settings()?;
    let file = File::open(&args.file)
        .await
        .map_err(|e| CliError::Io(format!("{}: {e}", args.file.display())))?;

    info!(file = %args.file.display(), "Replaying samples");
    let (dashboard, stats) = replay(
        BufReader::new(file),
        settings.retention(),
        settings.effective_channel_capacity(),
    )
    .await?;

    print_report(&dashboard, &stats, args.json)?;
    Ok(())
}

/// Feed every non-blank line of `reader` to a fresh listener.
///
/// A read error stops the replay; lines read before it are still ingested
/// but the error is returned.
pub async fn replay<R>(
    mut reader: R,
    retention: RetentionPolicy,
    capacity: usize,
) -> Result<(Dashboard, ListenerStats), CliError>
where
    R: AsyncBufRead + Unpin,
{
    let (tx, rx) = mpsc::channel(capacity);
    let consumer = tokio::spawn(StreamListener::new(Dashboard::new(retention)).run(rx));

    let mut buf = Vec::new();
    let mut failure = None;
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                // Invalid UTF-8 reaches the listener as U+FFFD and is counted as malformed.
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if tx.send(FeedMessage::message(line)).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }
    drop(tx);

    let result = consumer.await?;
    match failure {
        Some(e) => Err(e.into()),
        None => Ok(result),
    }
}
