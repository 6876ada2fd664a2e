//! Rate-limit tracking for the GitHub API
//!
//! The limiter is a plain handle owned by the client rather than process
//! state, so tests can construct one in any condition and check the sleep
//! computation without waiting.

use chrono::{DateTime, TimeZone, Utc};
use std::time::Duration;
use tracing::{debug, warn};

/// Extra seconds slept past the advertised reset to avoid boundary races
pub const DEFAULT_GRACE_SECS: u64 = 5;

/// Tracks the remaining request quota and its reset time.
///
/// `remaining`/`reset_at` are refreshed from the `x-ratelimit-*` headers of
/// the most recent API response. When the quota is exhausted,
/// [`wait_if_needed`](RateLimiter::wait_if_needed) suspends the caller until
/// past the reset.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    grace: Duration,
    remaining: Option<u64>,
    reset_at: Option<DateTime<Utc>>,
}

impl RateLimiter {
    pub fn new(grace_secs: u64) -> Self {
        Self {
            grace: Duration::from_secs(grace_secs),
            remaining: None,
            reset_at: None,
        }
    }

    /// Record quota state observed on an API response
    pub fn observe(&mut self, remaining: Option<u64>, reset_epoch: Option<i64>) {
        if let Some(remaining) = remaining {
            self.remaining = Some(remaining);
        }
        if let Some(epoch) = reset_epoch {
            self.reset_at = Utc.timestamp_opt(epoch, 0).single();
        }
        debug!(remaining = ?self.remaining, reset_at = ?self.reset_at, "observe: quota updated");
    }

    /// Mark the quota exhausted until the given reset time
    ///
    /// Called when the API rejects a request outright; the next
    /// `wait_if_needed` will sleep even if no headers were seen.
    pub fn exhausted(&mut self, reset_at: Option<DateTime<Utc>>) {
        self.remaining = Some(0);
        if reset_at.is_some() {
            self.reset_at = reset_at;
        }
    }

    /// Sleep until the quota has replenished, if it is exhausted
    pub async fn wait_if_needed(&mut self) {
        if self.remaining != Some(0) {
            return;
        }
        let sleep = self.sleep_duration(Utc::now());
        warn!("Rate limit exceeded, waiting {} seconds", sleep.as_secs());
        tokio::time::sleep(sleep).await;
        // Quota state is stale after the reset; the next response refreshes it
        self.remaining = None;
        self.reset_at = None;
    }

    /// How long to sleep from `now`: `max(0, reset_at - now) + grace`
    ///
    /// With no known reset time only the grace period is slept.
    fn sleep_duration(&self, now: DateTime<Utc>) -> Duration {
        let until_reset = self
            .reset_at
            .map(|reset| (reset - now).to_std().unwrap_or(Duration::ZERO))
            .unwrap_or(Duration::ZERO);
        until_reset + self.grace
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_GRACE_SECS)
    }
}
