//! Main CLI parser and top-level argument handling.

use clap::Parser;

use crate::commands::Commands;

/// Subscribe to a metrics event stream and chart it per category.
#[derive(Parser)]
#[command(name = "feedchart")]
#[command(about = "Chart per-category metrics from a server-sent event feed")]
#[command(version)]
pub struct Cli {
    /// Enable verbose/debug output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
