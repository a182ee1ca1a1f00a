//! Geometric backoff schedule for the poll loop.

use gaphunter_core::config::PollingConfig;
use std::time::Duration;

/// Poll interval schedule: starts short, grows geometrically, capped.
///
/// The interval sequence is monotonic non-decreasing and bounded by the
/// cap. Growth is computed in whole milliseconds with rounding.
#[derive(Debug, Clone)]
pub struct BackoffSchedule {
    current_ms: u64,
    multiplier: f64,
    max_ms: u64,
}

impl BackoffSchedule {
    /// Create a schedule from explicit parameters.
    #[must_use]
    pub fn new(initial: Duration, multiplier: f64, max: Duration) -> Self {
        Self {
            current_ms: u64::try_from(initial.as_millis()).unwrap_or(u64::MAX),
            multiplier,
            max_ms: u64::try_from(max.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Create a schedule from polling configuration.
    #[must_use]
    pub fn from_config(config: &PollingConfig) -> Self {
        Self::new(
            config.initial_interval(),
            config.backoff_multiplier,
            config.max_interval(),
        )
    }

    /// The interval the next wait would use.
    #[must_use]
    pub fn current(&self) -> Duration {
        Duration::from_millis(self.current_ms)
    }

    /// Take the current interval and grow the schedule for the next poll.
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn advance(&mut self) -> Duration {
        let interval = self.current_ms;
        let grown = (self.current_ms as f64 * self.multiplier).round() as u64;
        self.current_ms = grown.min(self.max_ms);
        Duration::from_millis(interval)
    }
}
