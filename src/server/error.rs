//! Error responses of the review endpoint.
//!
//! Every failure leaves as `{"error": "<message>"}`. Provider failures map
//! to fixed messages; the underlying detail is logged, never returned.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::constants;
use crate::models::ErrorBody;

/// Errors returned to HTTP clients.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("code must be at most {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("origin not allowed")]
    OriginNotAllowed,

    #[error("{}", constants::UPSTREAM_FAILED_MESSAGE)]
    Upstream,

    #[error("{}", constants::UPSTREAM_TIMEOUT_MESSAGE)]
    Timeout,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::OriginNotAllowed => StatusCode::FORBIDDEN,
            ApiError::Upstream => StatusCode::BAD_GATEWAY,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(
            ApiError::InvalidInput("x".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::PayloadTooLarge { limit: 1 }.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ApiError::OriginNotAllowed.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::Upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(ApiError::Timeout.status(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn upstream_messages_are_fixed() {
        assert_eq!(
            ApiError::Upstream.to_string(),
            constants::UPSTREAM_FAILED_MESSAGE
        );
        assert_eq!(
            ApiError::Timeout.to_string(),
            constants::UPSTREAM_TIMEOUT_MESSAGE
        );
    }
}
