//! Subcommands and their arguments.
//!
//! Every option can also come from a `FEEDCHART_*` environment variable.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use feedchart_core::{Settings, SettingsUpdate, validate_settings};

use crate::error::CliError;

#[derive(Subcommand)]
pub enum Commands {
    /// Subscribe to the feed and chart samples until interrupted
    Watch(WatchArgs),

    /// Chart samples from a file with one JSON payload per line
    Replay(ReplayArgs),
}

/// Point retention shared by both commands.
#[derive(Args, Debug, Clone, Default)]
pub struct RetentionArgs {
    /// Keep at most this many points per series
    #[arg(long, env = "FEEDCHART_MAX_POINTS")]
    pub max_points: Option<usize>,

    /// Drop points older than this many seconds before the newest one
    #[arg(long, env = "FEEDCHART_MAX_AGE_SECS")]
    pub max_age_secs: Option<u64>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct WatchArgs {
    /// Base URL of the feed server
    #[arg(long, env = "FEEDCHART_BASE_URL")]
    pub base_url: Option<String>,

    /// Path of the event stream
    #[arg(long, env = "FEEDCHART_FEED_PATH")]
    pub feed_path: Option<String>,

    /// Reconnection delay in milliseconds
    #[arg(long, env = "FEEDCHART_RETRY_MS")]
    pub retry_ms: Option<u64>,

    /// Ceiling for the reconnection delay in milliseconds
    #[arg(long, env = "FEEDCHART_MAX_RETRY_MS")]
    pub max_retry_ms: Option<u64>,

    /// Grow the delay by this factor after each failed attempt
    #[arg(long, env = "FEEDCHART_BACKOFF_FACTOR")]
    pub backoff_factor: Option<f64>,

    /// Messages buffered between the connection and the charts
    #[arg(long, env = "FEEDCHART_CHANNEL_CAPACITY")]
    pub channel_capacity: Option<usize>,

    /// Seconds between progress log lines (0 disables)
    #[arg(long, env = "FEEDCHART_SUMMARY_INTERVAL_SECS")]
    pub summary_interval_secs: Option<u64>,

    #[command(flatten)]
    pub retention: RetentionArgs,

    /// Print the final summary as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ReplayArgs {
    /// File with one JSON sample per line
    pub file: PathBuf,

    #[command(flatten)]
    pub retention: RetentionArgs,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl RetentionArgs {
    fn update(&self) -> SettingsUpdate {
        SettingsUpdate {
            max_points: self.max_points.map(Some),
            max_age_secs: self.max_age_secs.map(Some),
            ..SettingsUpdate::default()
        }
    }
}

impl WatchArgs {
    /// Defaults overlaid with whatever was given on the command line.
    pub fn settings(&self) -> Result<Settings, CliError> {
        let mut settings = Settings::with_defaults();
        settings.merge(&SettingsUpdate {
            base_url: self.base_url.clone().map(Some),
            feed_path: self.feed_path.clone().map(Some),
            retry_ms: self.retry_ms.map(Some),
            max_retry_ms: self.max_retry_ms.map(Some),
            backoff_factor: self.backoff_factor.map(Some),
            channel_capacity: self.channel_capacity.map(Some),
            summary_interval_secs: self.summary_interval_secs.map(Some),
            ..self.retention.update()
        });
        validate_settings(&settings)?;
        Ok(settings)
    }
}

impl ReplayArgs {
    pub fn settings(&self) -> Result<Settings, CliError> {
        let mut settings = Settings::with_defaults();
        settings.merge(&self.retention.update());
        validate_settings(&settings)?;
        Ok(settings)
    }
}
