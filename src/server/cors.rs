//! Cross-origin enforcement.
//!
//! Browsers send `Origin` on cross-origin calls. A request whose origin is
//! not configured is refused outright with 403 rather than merely left
//! without CORS headers, so a disallowed page cannot spend provider quota
//! through the proxy. Requests without `Origin` (curl, the CLI client)
//! pass through untouched.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::{ApiError, AppState};

const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";
const ALLOWED_HEADERS: &str = "content-type";
const PREFLIGHT_MAX_AGE_SECS: &str = "600";

/// Every response carries `Vary: Origin`, including refusals and requests
/// without an `Origin`, so shared caches key on it.
pub async fn enforce_origin(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = check_origin(&state, request, next).await;
    response
        .headers_mut()
        .append(header::VARY, HeaderValue::from_static("Origin"));
    response
}

async fn check_origin(state: &AppState, request: Request, next: Next) -> Response {
    let Some(origin) = request.headers().get(header::ORIGIN).cloned() else {
        return next.run(request).await;
    };

    let allowed = origin
        .to_str()
        .map(|o| state.origin_allowed(o))
        .unwrap_or(false);
    if !allowed {
        tracing::warn!(
            origin = ?origin,
            path = %request.uri().path(),
            "refused request from disallowed origin"
        );
        return ApiError::OriginNotAllowed.into_response();
    }

    if request.method() == Method::OPTIONS {
        let mut response = StatusCode::NO_CONTENT.into_response();
        let headers = response.headers_mut();
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static(PREFLIGHT_MAX_AGE_SECS),
        );
        allow(&mut response, origin);
        return response;
    }

    let mut response = next.run(request).await;
    allow(&mut response, origin);
    response
}

fn allow(response: &mut Response, origin: HeaderValue) {
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
}
