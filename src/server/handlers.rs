//! Route handlers.

use std::sync::Arc;
use std::time::Instant;

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::constants;
use crate::models::ReviewRequest;
use crate::prompt;
use crate::providers::{ProviderError, generate_with_retry};

use super::{ApiError, AppState};

/// Body of `GET /` and `GET /health`.
#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub version: &'static str,
    pub template: String,
    pub template_version: u32,
    pub template_fingerprint: String,
}

pub async fn health(State(state): State<Arc<AppState>>) -> Json<Health> {
    Json(Health {
        status: "ok",
        version: constants::VERSION,
        template: state.template.meta.name.clone(),
        template_version: state.template.meta.version,
        template_fingerprint: state.template.fingerprint(),
    })
}

/// `POST /ai/get-review`: validate, build the prompt, call the provider.
///
/// The whole provider phase (waiting for a permit, every retry) runs under
/// `server.request_timeout`. If the client disconnects, axum drops this
/// future and the outbound call with it.
pub async fn review(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ReviewRequest>, JsonRejection>,
) -> Result<Response, ApiError> {
    let request_id = uuid::Uuid::new_v4();
    let started = Instant::now();

    let Json(body) = payload.map_err(|rejection| {
        tracing::info!(%request_id, "rejected malformed review body: {rejection}");
        reject_body(&rejection, state.server.max_code_bytes)
    })?;

    if let Err(e) = validate_code(&body.code, state.server.max_code_bytes) {
        tracing::info!(%request_id, bytes = body.code.len(), "rejected review input: {e}");
        return Err(e);
    }

    let completion = prompt::build(&state.template, &body.code);
    tracing::info!(
        %request_id,
        bytes = body.code.len(),
        template = %completion.template_name,
        "review requested"
    );

    let outcome = tokio::time::timeout(state.server.request_timeout(), async {
        let _permit = state
            .upstream
            .acquire()
            .await
            .map_err(|_| ProviderError::Api("upstream limiter closed".to_string()))?;
        generate_with_retry(state.model.as_ref(), &completion, state.retry).await
    })
    .await;

    let elapsed_ms = started.elapsed().as_millis() as u64;
    match outcome {
        Ok(Ok(text)) => {
            tracing::info!(%request_id, elapsed_ms, chars = text.len(), "review completed");
            Ok((
                StatusCode::OK,
                [(header::CONTENT_TYPE, constants::MARKDOWN_CONTENT_TYPE)],
                text,
            )
                .into_response())
        }
        Ok(Err(e)) => {
            tracing::error!(%request_id, elapsed_ms, "provider call failed: {e}");
            Err(ApiError::Upstream)
        }
        Err(_) => {
            tracing::error!(
                %request_id,
                elapsed_ms,
                timeout_secs = state.server.request_timeout_secs,
                "provider call timed out"
            );
            Err(ApiError::Timeout)
        }
    }
}

/// Reject empty or oversized submissions before any provider call.
pub fn validate_code(code: &str, max_bytes: usize) -> Result<(), ApiError> {
    if code.trim().is_empty() {
        return Err(ApiError::InvalidInput("code must not be empty".to_string()));
    }
    if code.len() > max_bytes {
        return Err(ApiError::PayloadTooLarge { limit: max_bytes });
    }
    Ok(())
}

fn reject_body(rejection: &JsonRejection, max_bytes: usize) -> ApiError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ApiError::PayloadTooLarge { limit: max_bytes };
    }
    ApiError::InvalidInput(
        r#"request body must be JSON of the form {"code": "<source>"}"#.to_string(),
    )
}
