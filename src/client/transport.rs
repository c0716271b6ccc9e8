//! How the dispatcher reaches the review endpoint.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::constants;
use crate::models::{ErrorBody, ReviewRequest};

/// Failures seen by the client side of a review.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The endpoint could not be reached or its reply could not be read.
    #[error("could not reach review service: {0}")]
    Unreachable(String),

    /// The endpoint answered with an error response.
    #[error("review service answered {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// Sends one review request and returns the Markdown body.
#[async_trait]
pub trait ReviewTransport: Send + Sync {
    async fn send(&self, request: &ReviewRequest) -> Result<String, TransportError>;
}

/// `reqwest`-backed transport posting JSON to a running endpoint.
pub struct HttpTransport {
    client: reqwest::Client,
    url: String,
}

impl HttpTransport {
    /// `endpoint` is either a base URL (`http://host:3000`) or the full
    /// review route; the route is appended when missing.
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Unreachable(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            url: review_url(endpoint),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ReviewTransport for HttpTransport {
    async fn send(&self, request: &ReviewRequest) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Unreachable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError::Unreachable(format!("failed to read response: {e}")))?;

        if status.is_success() {
            return Ok(body);
        }

        let message = serde_json::from_str::<ErrorBody>(&body)
            .map(|b| b.error)
            .unwrap_or_else(|_| {
                status
                    .canonical_reason()
                    .unwrap_or("unexpected response")
                    .to_string()
            });
        Err(TransportError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

fn review_url(endpoint: &str) -> String {
    let base = endpoint.trim_end_matches('/');
    if base.ends_with(constants::REVIEW_ROUTE) || base.ends_with(constants::REVIEW_ROUTE_ALIAS) {
        base.to_string()
    } else {
        format!("{base}{}", constants::REVIEW_ROUTE)
    }
}
