//! Bounded retry with exponential backoff for single catalog calls.
//!
//! Only [`CatalogError::is_transient`] failures are repeated. A `Retry-After` hint
//! from the service replaces the computed backoff, unless it is longer than
//! [`RetryPolicy::max_retry_after`], in which case the call gives up right away.

use std::{future::Future, time::Duration};

use tokio_util::sync::CancellationToken;

use crate::error::CatalogError;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total number of attempts, the first one included. `1` disables retries.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub max_retry_after: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_retry_after: Duration::from_secs(120),
        }
    }
}

impl RetryPolicy {
    /// Policy allowing `retries` additional attempts after the first one.
    pub fn with_retries(retries: u32) -> Self {
        Self {
            max_attempts: retries.saturating_add(1),
            ..Self::default()
        }
    }

    /// Backoff before attempt `attempt + 1`, where `attempt` counts from 1.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    /// Delay before repeating a call that failed with `error` on `attempt`, or
    /// `None` when the failure must be returned.
    pub fn delay_for(&self, error: &CatalogError, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts || !error.is_transient() {
            return None;
        }

        match error.retry_after() {
            Some(hint) if hint > self.max_retry_after => None,
            Some(hint) => Some(hint),
            None => Some(self.backoff(attempt)),
        }
    }

    /// Runs `op` until it succeeds, fails permanently, runs out of attempts, or the
    /// token is cancelled while waiting. The last error is returned.
    pub async fn run<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut op: F,
    ) -> Result<T, CatalogError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CatalogError>>,
    {
        let mut attempt = 1;
        loop {
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };

            let Some(delay) = self.delay_for(&error, attempt) else {
                return Err(error);
            };

            tokio::select! {
                _ = cancel.cancelled() => return Err(error),
                _ = tokio::time::sleep(delay) => {}
            }
            attempt += 1;
        }
    }
}
