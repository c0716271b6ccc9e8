//! Bounded exponential backoff for transient provider errors.

use std::time::Duration;

use crate::config::RetryConfig;
use crate::models::CompletionRequest;

use super::{ModelClient, ProviderError, classify_error, is_retryable};

/// How many times, and how patiently, to retry a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Compute the backoff duration for a retry attempt using exponential backoff.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let backoff = self
            .initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt));
        backoff.min(self.max_backoff)
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            max_backoff: Duration::from_millis(config.max_backoff_ms),
        }
    }
}

/// Call `client.generate`, retrying transient errors per `policy`.
///
/// Permanent errors return immediately. The caller bounds the total
/// time; dropping the returned future abandons the in-flight attempt.
pub async fn generate_with_retry(
    client: &dyn ModelClient,
    request: &CompletionRequest,
    policy: RetryPolicy,
) -> Result<String, ProviderError> {
    let mut attempt = 0;
    loop {
        match client.generate(request).await {
            Ok(text) => return Ok(text),
            Err(e) if is_retryable(&e) && attempt < policy.max_retries => {
                let backoff = policy.backoff(attempt);
                tracing::warn!(
                    attempt = attempt + 1,
                    max = policy.max_retries + 1,
                    backoff_ms = backoff.as_millis() as u64,
                    reason = classify_error(&e).unwrap_or("Transient error"),
                    "provider call failed, retrying"
                );
                tokio::time::sleep(backoff).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
