//! Reconnection delays.
//!
//! EventSource reconnects after a fixed delay that the server may change
//! with `retry:`. A backoff factor above `1.0` grows the delay after each
//! consecutive failure, up to a ceiling.

use std::time::Duration;

use feedchart_core::Settings;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconnectPolicy {
    pub initial: Duration,
    pub max: Duration,
    pub factor: f64,
}

impl ReconnectPolicy {
    /// Constant delay, like a browser.
    pub const fn fixed(delay: Duration) -> Self {
        Self {
            initial: delay,
            max: delay,
            factor: 1.0,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            initial: settings.effective_retry(),
            max: settings.effective_max_retry(),
            factor: settings.effective_backoff_factor(),
        }
    }
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self::from_settings(&Settings::with_defaults())
    }
}

/// Delay state for one subscription.
#[derive(Debug, Clone)]
pub struct Backoff {
    policy: ReconnectPolicy,
    base: Duration,
    current: Duration,
}

impl Backoff {
    pub const fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            base: policy.initial,
            current: policy.initial,
        }
    }

    /// Delay to wait before the next attempt; grows the one after it.
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        // A server-announced delay may exceed the configured ceiling.
        let ceiling = self.policy.max.max(self.base);
        let grown = (self.current.as_nanos() as f64 * self.policy.factor).round();
        self.current = if grown >= ceiling.as_nanos() as f64 {
            ceiling
        } else {
            Duration::from_nanos(grown as u64)
        };
        delay
    }

    /// Back to the base delay after a successful connection.
    pub const fn reset(&mut self) {
        self.current = self.base;
    }

    /// Replace the base delay, as the `retry:` field does.
    pub const fn set_base(&mut self, delay: Duration) {
        self.base = delay;
        self.current = delay;
    }

    pub const fn base(&self) -> Duration {
        self.base
    }
}
