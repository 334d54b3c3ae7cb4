//! Command-line front end for feedchart.
//!
//! `watch` subscribes to a live feed; `replay` runs a recorded file through
//! the same listener. Both print a per-chart summary at the end.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only.
use dotenvy as _;

pub mod commands;
pub mod error;
pub mod handlers;
pub mod logging;
pub mod parser;
pub mod presentation;

pub use commands::{Commands, ReplayArgs, RetentionArgs, WatchArgs};
pub use error::CliError;
pub use logging::init_logging;
pub use parser::Cli;
