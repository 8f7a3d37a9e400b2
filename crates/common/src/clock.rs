//! Loop pacing on a monotonic clock.
//!
//! Each capture iteration is budgeted a fixed interval. Work that finishes
//! early sleeps the remainder; work that overruns proceeds at once. No
//! correction carries over between iterations, so an overrun is never paid
//! back by shortening the next sleep.

use std::time::Duration;

use tokio::time::Instant;

/// Holds a capture loop to a minimum iteration period.
#[derive(Debug, Clone, Copy)]
pub struct FramePacer {
    target_interval: Duration,
}

impl FramePacer {
    /// Create a pacer with the given minimum iteration period.
    pub fn new(target_interval: Duration) -> Self {
        Self { target_interval }
    }

    /// Time left to sleep after spending `elapsed` on an iteration, or
    /// `None` when the budget is already used up.
    pub fn remainder(&self, elapsed: Duration) -> Option<Duration> {
        self.target_interval
            .checked_sub(elapsed)
            .filter(|rest| !rest.is_zero())
    }

    /// Sleep out whatever is left of the budget for an iteration that
    /// started at `started`. Returns how long it slept.
    pub async fn pace(&self, started: Instant) -> Duration {
        match self.remainder(started.elapsed()) {
            Some(rest) => {
                tokio::time::sleep(rest).await;
                rest
            }
            None => Duration::ZERO,
        }
    }
}
