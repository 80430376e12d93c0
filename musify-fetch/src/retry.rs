//! Retry policy for transport failures.
//!
//! Paging loads use a fixed-delay policy: 3 retries (4 attempts in total)
//! with 2000 ms between attempts and no backoff growth. Only transient
//! transport errors are retried; API-level and empty-response errors surface
//! on the first attempt.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::FetchError;

/// Retries performed by paging loads after the first attempt.
pub const PAGING_MAX_RETRIES: u32 = 3;

/// Fixed delay between paging attempts.
pub const PAGING_RETRY_DELAY: Duration = Duration::from_millis(2000);

/// Strategy for retrying failed requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryStrategy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before every retry.
    pub delay: Duration,
}

impl RetryStrategy {
    /// Creates a fixed-delay strategy.
    pub fn fixed(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    /// The policy used by paging sources.
    pub fn paging() -> Self {
        Self::fixed(PAGING_MAX_RETRIES, PAGING_RETRY_DELAY)
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self::fixed(0, Duration::ZERO)
    }

    /// Delay before the given retry (1-based). Constant across retries.
    pub fn delay_for_attempt(&self, _attempt: u32) -> Duration {
        self.delay
    }

    /// Determines if an error should be retried.
    pub fn should_retry(&self, error: &FetchError) -> bool {
        error.is_transient()
    }

    /// Runs `operation`, retrying transient failures per this strategy.
    pub async fn run<T, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, FetchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        let mut retries = 0;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if retries < self.max_retries && self.should_retry(&e) => {
                    retries += 1;
                    let delay = self.delay_for_attempt(retries);
                    warn!(
                        operation = label,
                        error = %e,
                        retry = retries,
                        max_retries = self.max_retries,
                        delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                        "Request failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryStrategy {
    fn default() -> Self {
        Self::paging()
    }
}
