//! Two-phase cycle timing
//!
//! Every cycle waits the fixed guard delay, observes, and then waits the rest
//! of the configured interval. The guard delay is never skipped; the second
//! delay is skipped when the interval is no longer than the guard.

use std::time::Duration;

use crate::config::{DdnsConfig, LOOP_GUARD_SECS};

/// Timing for one observation cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schedule {
    guard: Duration,
    interval: Duration,
}

impl Schedule {
    /// Create a schedule, raising `interval` to at least `guard`
    pub fn new(guard: Duration, interval: Duration) -> Self {
        Self {
            guard,
            interval: interval.max(guard),
        }
    }

    /// Schedule for a configuration, using the standard guard
    pub fn from_config(config: &DdnsConfig) -> Self {
        Self::new(
            Duration::from_secs(LOOP_GUARD_SECS),
            Duration::from_secs(config.polling.update_interval),
        )
    }

    /// Delay before every observation
    pub fn guard(&self) -> Duration {
        self.guard
    }

    /// Time between the starts of consecutive observations
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay after handling an observation; `None` when there is nothing left to wait
    pub fn remainder(&self) -> Option<Duration> {
        let remaining = self.interval.saturating_sub(self.guard);
        (!remaining.is_zero()).then_some(remaining)
    }
}
