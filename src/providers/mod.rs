//! ModelClient trait and LLM integration.
//!
//! Provides an abstraction layer over rig-core so the review endpoint
//! depends on a single `generate` call rather than on a specific LLM
//! library, and so tests can substitute a stand-in provider.

pub mod retry;
pub mod rig;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::CompletionRequest;

pub use retry::{RetryPolicy, generate_with_retry};

/// Errors from the model client.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    Api(String),

    #[error("LLM returned an empty response")]
    EmptyResponse,

    #[error("provider not configured: {0}")]
    NotConfigured(String),
}

/// A text-generation backend.
///
/// Implementations perform exactly one outbound call per `generate` and
/// keep no state between calls, so a single instance is shared by every
/// request the server handles.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Send the instruction and user content, return the generated text.
    async fn generate(&self, request: &CompletionRequest) -> Result<String, ProviderError>;
}

/// Check whether a provider error is transient and worth retrying.
///
/// Only API errors that look like rate limiting, gateway/server failures,
/// timeouts or connection problems qualify. Auth and validation failures,
/// empty responses and configuration errors are permanent.
pub fn is_retryable(err: &ProviderError) -> bool {
    classify_error(err).is_some()
}

/// Classifies a provider error into a short, log-friendly reason.
///
/// Returns `Some(reason)` for transient errors, `None` otherwise.
pub fn classify_error(err: &ProviderError) -> Option<&'static str> {
    let ProviderError::Api(msg) = err else {
        return None;
    };
    let msg_lower = msg.to_lowercase();
    if msg_lower.contains("401")
        || msg_lower.contains("403")
        || msg_lower.contains("unauthorized")
        || msg_lower.contains("api key")
    {
        None
    } else if msg_lower.contains("429")
        || msg_lower.contains("rate limit")
        || msg_lower.contains("too many requests")
        || msg_lower.contains("resource_exhausted")
    {
        Some("Rate limited by API")
    } else if msg_lower.contains("503")
        || msg_lower.contains("service unavailable")
        || msg_lower.contains("high demand")
    {
        Some("High model load")
    } else if msg_lower.contains("529") || msg_lower.contains("overloaded") {
        Some("API overloaded")
    } else if msg_lower.contains("502") || msg_lower.contains("bad gateway") {
        Some("API gateway error")
    } else if msg_lower.contains("500") || msg_lower.contains("internal server error") {
        Some("Provider internal error")
    } else if msg_lower.contains("504")
        || msg_lower.contains("timeout")
        || msg_lower.contains("timed out")
    {
        Some("Request timed out")
    } else if msg_lower.contains("connection") {
        Some("Connection error")
    } else if msg_lower.contains("temporarily") || msg_lower.contains("try again") {
        Some("Temporary API error")
    } else {
        None
    }
}
