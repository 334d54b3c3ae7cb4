//! Services built on the domain types and ports.

mod listener;

pub use listener::{ListenerStats, Outcome, StreamListener};
