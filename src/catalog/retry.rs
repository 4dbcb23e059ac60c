//! Bounded retry for catalog requests.
//!
//! Transient transport failures get a second and third chance with
//! exponential backoff and jitter. Payload problems are not retried:
//! the catalog answers key failures with HTML 200s, so a malformed
//! body will be malformed again.

use std::time::Duration;
use tokio::time::sleep;

use crate::errors::SourceError;

const MAX_RETRIES: u32 = 2;
const BASE_DELAY_MS: u64 = 1000;
const MAX_DELAY_MS: u64 = 4000;

/// Retry policy with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_retries: u32,
    base_delay_ms: u64,
    enable_jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: MAX_RETRIES,
            base_delay_ms: BASE_DELAY_MS,
            enable_jitter: true,
        }
    }
}

impl RetryPolicy {
    pub fn with_config(max_retries: u32, base_delay_ms: u64) -> Self {
        Self {
            max_retries,
            base_delay_ms,
            enable_jitter: true,
        }
    }

    /// Run `operation`, retrying transient failures up to the configured
    /// attempt count. The final error is returned unchanged.
    pub async fn run<F, Fut, T>(&self, mut operation: F) -> Result<T, SourceError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, SourceError>>,
    {
        let mut attempt = 0;

        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    if !is_retryable(&e) || attempt >= self.max_retries {
                        return Err(e);
                    }
                    let delay = self.delay_for(attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "retrying catalog request"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    fn delay_for(&self, attempt: u32) -> Duration {
        let exponential = self.base_delay_ms * 2u64.pow(attempt);
        let delay_ms = exponential.min(MAX_DELAY_MS);

        // ±25% jitter keeps repeated clients from thundering in step
        let final_ms = if self.enable_jitter {
            let jitter = (delay_ms / 4) as i64;
            let offset = ((rand::random::<f64>() * 2.0 - 1.0) * jitter as f64) as i64;
            ((delay_ms as i64) + offset).max(0) as u64
        } else {
            delay_ms
        };

        Duration::from_millis(final_ms)
    }
}

fn is_retryable(error: &SourceError) -> bool {
    match error {
        SourceError::Unavailable { .. } => true,
        SourceError::Timeout { .. } => true,
        SourceError::Http(_) => true,
        SourceError::MalformedPayload { .. } => false,
        SourceError::Json(_) => false,
    }
}
