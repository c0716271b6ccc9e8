//! Shared helpers: a stand-in model client and a loopback endpoint.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

use codereview::config::ServerConfig;
use codereview::models::CompletionRequest;
use codereview::prompt;
use codereview::providers::{ModelClient, ProviderError, RetryPolicy};
use codereview::server::{self, AppState};

/// What the stand-in does on every call.
#[derive(Clone)]
pub enum Behavior {
    Reply(String),
    Fail(String),
    /// Reply after a delay.
    Slow(Duration, String),
    /// Fail with `error` for the first `failures` calls, then reply.
    FailThenReply {
        failures: usize,
        error: String,
        text: String,
    },
}

/// A model client that never leaves the process and counts its calls.
pub struct StandIn {
    behavior: Behavior,
    calls: AtomicUsize,
    last_user_content: std::sync::Mutex<Option<String>>,
}

impl StandIn {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
            last_user_content: std::sync::Mutex::new(None),
        })
    }

    pub fn replying(text: &str) -> Arc<Self> {
        Self::new(Behavior::Reply(text.to_string()))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_user_content(&self) -> Option<String> {
        self.last_user_content.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelClient for StandIn {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_user_content.lock().unwrap() = Some(request.user_content.clone());
        match &self.behavior {
            Behavior::Reply(text) => Ok(text.clone()),
            Behavior::Fail(message) => Err(ProviderError::Api(message.clone())),
            Behavior::Slow(delay, text) => {
                tokio::time::sleep(*delay).await;
                Ok(text.clone())
            }
            Behavior::FailThenReply {
                failures,
                error,
                text,
            } => {
                if call < *failures {
                    Err(ProviderError::Api(error.clone()))
                } else {
                    Ok(text.clone())
                }
            }
        }
    }
}

/// A running endpoint on an ephemeral loopback port.
pub struct TestServer {
    pub base_url: String,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Server settings suited to tests: one allowed origin, short timeout.
pub fn test_server_config() -> ServerConfig {
    ServerConfig {
        allowed_origins: vec!["http://ui.test".to_string()],
        request_timeout_secs: 5,
        ..ServerConfig::default()
    }
}

pub async fn spawn_server(model: Arc<StandIn>, config: ServerConfig) -> TestServer {
    spawn_server_with_retry(model, config, RetryPolicy::none()).await
}

pub async fn spawn_server_with_retry(
    model: Arc<StandIn>,
    config: ServerConfig,
    retry: RetryPolicy,
) -> TestServer {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let template = prompt::builtin_template().unwrap();
    let state = Arc::new(AppState::new(
        model as Arc<dyn ModelClient>,
        template,
        config,
        retry,
    ));

    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server::serve_with_shutdown(listener, state, async {
        let _ = rx.await;
    }));

    TestServer {
        base_url: format!("http://{addr}"),
        shutdown: Some(tx),
    }
}
