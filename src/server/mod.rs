//! HTTP review endpoint.
//!
//! An axum router exposing `POST /ai/get-review` (alias `/review`) and a
//! health route. Each request is handled independently; the only shared
//! state is read-only configuration, the prompt template, the model client,
//! and a semaphore bounding outbound provider calls.

pub mod cors;
pub mod error;
pub mod handlers;

use std::future::Future;
use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use tokio::net::TcpListener;
use tokio::sync::Semaphore;

use crate::config::ServerConfig;
use crate::constants;
use crate::models::PromptTemplate;
use crate::providers::{ModelClient, RetryPolicy};

pub use error::ApiError;

/// State shared by every request handler.
pub struct AppState {
    pub model: Arc<dyn ModelClient>,
    pub template: PromptTemplate,
    pub server: ServerConfig,
    pub retry: RetryPolicy,
    /// Permits for in-flight provider calls.
    upstream: Semaphore,
}

impl AppState {
    pub fn new(
        model: Arc<dyn ModelClient>,
        template: PromptTemplate,
        server: ServerConfig,
        retry: RetryPolicy,
    ) -> Self {
        let permits = server.max_concurrent_reviews.max(1);
        Self {
            model,
            template,
            server,
            retry,
            upstream: Semaphore::new(permits),
        }
    }

    /// Exact, case-sensitive match against the configured origins.
    ///
    /// A trailing slash on either side is ignored since browsers never
    /// send one but config files sometimes include it.
    pub fn origin_allowed(&self, origin: &str) -> bool {
        let origin = origin.trim_end_matches('/');
        self.server
            .allowed_origins
            .iter()
            .any(|allowed| allowed.trim_end_matches('/') == origin)
    }
}

/// Build the router with routes, origin enforcement and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let limit = body_limit(state.server.max_code_bytes);
    Router::new()
        .route("/", get(handlers::health))
        .route(constants::HEALTH_ROUTE, get(handlers::health))
        .route(constants::REVIEW_ROUTE, post(handlers::review))
        .route(constants::REVIEW_ROUTE_ALIAS, post(handlers::review))
        .layer(DefaultBodyLimit::max(limit))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state),
            cors::enforce_origin,
        ))
        .with_state(state)
}

/// Largest request body accepted for a given code limit.
///
/// JSON escaping can grow code up to six bytes per input byte (`\u0000`),
/// plus the envelope. The code itself is checked against `max_code_bytes`
/// after decoding.
pub fn body_limit(max_code_bytes: usize) -> usize {
    max_code_bytes.saturating_mul(6).saturating_add(1024)
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    serve_with_shutdown(listener, state, async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for shutdown signal: {e}");
            std::future::pending::<()>().await;
        }
        tracing::info!("shutdown signal received, draining connections");
    })
    .await
}

/// Serve until `shutdown` resolves, then finish in-flight requests.
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    state: Arc<AppState>,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(
            %addr,
            template = %state.template.meta.name,
            template_version = state.template.meta.version,
            fingerprint = %state.template.fingerprint(),
            origins = ?state.server.allowed_origins,
            "review endpoint listening"
        );
    }
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
