use std::future::Future;
use std::time::Duration;

use crate::config::Config;
use crate::error::AppResult;

/// Bounded retry with exponential backoff
///
/// Any failed attempt (transport error, non-2xx status, bad body) is retried
/// after `base_delay * 2^attempt`, up to `max_retries` retries, with no
/// jitter. The last error is surfaced once retries are exhausted. An optional
/// `deadline` caps the total backoff wait of one chain: when the next sleep
/// would cross it, the chain stops early with the last error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub deadline: Option<Duration>,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
            deadline: None,
        }
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
            deadline: config.retry_deadline_ms.map(Duration::from_millis),
        }
    }

    /// Backoff before retry number `attempt + 1` (zero-based)
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt)
    }

    /// Runs `op` until it succeeds or the retry budget is spent.
    ///
    /// Performs exactly `min(failures + 1, max_retries + 1)` attempts and
    /// never retries after a success.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 0u32;
        let mut waited = Duration::ZERO;

        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if attempt >= self.max_retries {
                        tracing::warn!(
                            attempts = attempt + 1,
                            error = %err,
                            "Retries exhausted"
                        );
                        return Err(err);
                    }

                    let delay = self.backoff_delay(attempt);
                    if let Some(deadline) = self.deadline {
                        if waited + delay > deadline {
                            tracing::warn!(
                                attempts = attempt + 1,
                                waited_ms = waited.as_millis() as u64,
                                "Retry deadline reached, giving up"
                            );
                            return Err(err);
                        }
                    }

                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Request failed, backing off before retry"
                    );
                    tokio::time::sleep(delay).await;
                    waited += delay;
                    attempt += 1;
                }
            }
        }
    }
}
