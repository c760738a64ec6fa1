//! Bounded retry for transient source failures.

use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use super::{ConfigSource, Pairs, SourceError};

/// Retry settings for fetching from a source.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Maximum delay between retries.
    pub max_delay: Duration,
    /// Factor by which delay increases after each retry.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given failed attempt (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(i32::MAX as u32) as i32;
        let factor = self.multiplier.max(1.0).powi(exponent);
        let secs = self.initial_delay.as_secs_f64() * factor;
        Duration::try_from_secs_f64(secs)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Fetches from `source`, retrying transient failures per `policy`.
///
/// Returns the last error together with the number of attempts made.
pub fn fetch_with_retry(
    source: &dyn ConfigSource,
    policy: &RetryPolicy,
) -> Result<Pairs, (SourceError, u32)> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match source.fetch() {
            Ok(pairs) => {
                debug!(source = source.name(), attempt, keys = pairs.len(), "source fetched");
                return Ok(pairs);
            }
            Err(e) if e.is_transient() && attempt < max_attempts => {
                let delay = policy.delay_after(attempt);
                warn!(
                    source = source.name(),
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "transient source failure, retrying"
                );
                thread::sleep(delay);
                attempt += 1;
            }
            Err(e) => return Err((e, attempt)),
        }
    }
}
