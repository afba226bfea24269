//! Per-worker request pacing
//!
//! Each worker owns a [`Pacer`]. After an attempt finishes, the worker sleeps
//! for whatever is left of the minimum interval, measured from the attempt's
//! start. This caps a single worker's attempt rate; the aggregate ceiling is
//! `workers / interval`.

use std::time::Duration;
use tokio::time::{sleep, Instant};

/// Enforces a minimum interval between the starts of consecutive attempts
#[derive(Debug, Clone, Copy)]
pub struct Pacer {
    min_interval: Duration,
}

impl Pacer {
    /// Create a pacer with the given floor
    pub fn new(min_interval: Duration) -> Self {
        Self { min_interval }
    }

    /// The configured floor
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time still owed for an attempt that took `elapsed`
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.min_interval.saturating_sub(elapsed)
    }

    /// Sleep until `min_interval` has passed since `started`.
    ///
    /// # Returns
    /// The delay that was applied (zero if the attempt was already slow enough)
    pub async fn pace(&self, started: Instant) -> Duration {
        let delay = self.remaining(started.elapsed());
        if !delay.is_zero() {
            sleep(delay).await;
        }
        delay
    }
}
