//! Bounded fixed-delay retry around transport calls.
//!
//! The loop is a small state machine: an attempt either succeeds, fails
//! permanently (returned untouched), or fails transiently. A transient failure
//! sleeps for the fixed delay and tries again until the attempt budget is
//! spent, at which point the last failure is wrapped in
//! [`FplError::RetryExhausted`].
//!
//! There is no backoff growth and no jitter. Sustained 429 responses will
//! therefore burn the whole budget at a constant rate.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::config::ClientConfig;
use crate::error::FplError;

/// Retry budget and inter-attempt delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Never below 1.
    max_attempts: u32,
    delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_RETRY_ATTEMPTS,
            crate::config::DEFAULT_RETRY_DELAY,
        )
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_delay)
    }

    /// A single attempt with no retries.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub const fn delay(&self) -> Duration {
        self.delay
    }

    /// Run `operation` until it succeeds, fails permanently, or the attempt
    /// budget is exhausted.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, FplError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FplError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match operation().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            if !error.is_transient() {
                return Err(error);
            }

            if attempt >= self.max_attempts {
                warn!(attempts = attempt, error = %error, "retry budget exhausted");
                return Err(FplError::RetryExhausted {
                    attempts: attempt,
                    source: Box::new(error),
                });
            }

            warn!(
                attempt,
                max_attempts = self.max_attempts,
                delay_ms = self.delay.as_millis() as u64,
                error = %error,
                "transient upstream failure, retrying"
            );
            tokio::time::sleep(self.delay).await;
            attempt += 1;
        }
    }
}
