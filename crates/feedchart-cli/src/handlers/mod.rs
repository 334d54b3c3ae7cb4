//! Command handlers.
//!
//! Each handler builds validated settings from its arguments, wires a
//! message source to a [`StreamListener`](feedchart_core::StreamListener)
//! and hands the result to [`crate::presentation`].

pub mod replay;
pub mod watch;
