//! Bounded retry with exponential backoff for background reads
//!
//! Only query fetches go through here. Mutations are never retried
//! automatically; a failed mutation rolls back and the operator decides.

use std::future::Future;
use std::time::Duration;

use crate::ports::outbound::FetchError;

/// Configuration for retry behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (0 = no retries, just the initial attempt)
    pub max_retries: u32,
    /// Base delay in milliseconds before first retry
    pub base_delay_ms: u64,
    /// Maximum delay in milliseconds (caps exponential growth)
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            base_delay_ms: 1000,
            max_delay_ms: 30_000,
        }
    }
}

impl RetryConfig {
    /// Single attempt, no retry
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (1-based): base * 2^(attempt-1), capped
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        Duration::from_millis(exponential.min(self.max_delay_ms))
    }
}

/// Run `operation` until it succeeds, fails with a non-transient error, or
/// the retry budget is spent.
pub async fn retry_transient<T, F, Fut>(
    config: &RetryConfig,
    operation_name: &str,
    mut operation: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0;
    loop {
        match operation().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::info!(
                        attempt = attempt + 1,
                        operation = operation_name,
                        "Fetch succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(e) if attempt < config.max_retries && e.is_transient() => {
                attempt += 1;
                let delay = config.delay_for(attempt);
                tracing::warn!(
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    operation = operation_name,
                    "Fetch failed, retrying..."
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                tracing::debug!(
                    attempts = attempt + 1,
                    error = %e,
                    operation = operation_name,
                    "Fetch failed, giving up"
                );
                return Err(e);
            }
        }
    }
}
