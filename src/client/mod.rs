//! Client-side review dispatch.
//!
//! [`Dispatcher`] owns the `Idle → Loading → {Succeeded, Failed}` state of
//! one review panel. It refuses a second submission while one is in flight,
//! clears the loading flag on every exit path (including a dropped future),
//! and discards a settlement that belongs to a cancelled submission so a
//! late response never overwrites a newer state.

pub mod transport;

use std::sync::Mutex;

use thiserror::Error;

use crate::constants;
use crate::models::{ReviewRequest, ReviewResult};

pub use transport::{HttpTransport, ReviewTransport, TransportError};

/// What the review panel currently shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DispatchState {
    #[default]
    Idle,
    Loading,
    Succeeded(String),
    Failed(String),
}

/// Why a submission produced no result.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("a review is already in progress")]
    Busy,

    #[error("the review was cancelled before it completed")]
    Superseded,
}

#[derive(Debug, Default)]
struct Inner {
    state: DispatchState,
    /// Bumped on every submission and cancellation.
    generation: u64,
}

/// Submits code to a [`ReviewTransport`] and tracks the panel state.
pub struct Dispatcher<T> {
    transport: T,
    inner: Mutex<Inner>,
}

impl<T: ReviewTransport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> DispatchState {
        self.lock().state.clone()
    }

    /// `true` strictly between a submission and its settlement.
    pub fn is_loading(&self) -> bool {
        self.lock().state == DispatchState::Loading
    }

    /// Abandon the in-flight submission, if any, and return to `Idle`.
    ///
    /// The abandoned request may still complete; its result is discarded.
    pub fn cancel(&self) {
        self.reset();
    }

    /// Clear any shown result or error and return to `Idle`.
    ///
    /// Also invalidates an in-flight submission, same as [`cancel`](Self::cancel).
    pub fn reset(&self) {
        let mut inner = self.lock();
        inner.generation += 1;
        inner.state = DispatchState::Idle;
    }

    /// Send `code` for review and wait for the outcome.
    ///
    /// Transport failures settle as `Failed` with the fixed
    /// "unable to connect" message; error responses from the endpoint
    /// settle with the endpoint's own (already opaque) message.
    pub async fn submit(&self, code: &str) -> Result<ReviewResult, DispatchError> {
        let generation = {
            let mut inner = self.lock();
            if inner.state == DispatchState::Loading {
                return Err(DispatchError::Busy);
            }
            inner.generation += 1;
            inner.state = DispatchState::Loading;
            inner.generation
        };
        let guard = LoadingGuard {
            inner: &self.inner,
            generation,
        };

        let outcome = self.transport.send(&ReviewRequest::new(code)).await;
        let result = match outcome {
            Ok(text) => ReviewResult::Success { text },
            Err(TransportError::Rejected { status, message }) => {
                tracing::debug!(status, "review rejected: {message}");
                ReviewResult::Failure { error: message }
            }
            Err(e @ TransportError::Unreachable(_)) => {
                tracing::debug!("review transport failed: {e}");
                ReviewResult::Failure {
                    error: constants::UNREACHABLE_MESSAGE.to_string(),
                }
            }
        };

        if guard.settle(&result) {
            Ok(result)
        } else {
            Err(DispatchError::Superseded)
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // State is plain data; a panic elsewhere cannot leave it half-written.
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Clears `Loading` if the submission ends without settling.
struct LoadingGuard<'a> {
    inner: &'a Mutex<Inner>,
    generation: u64,
}

impl LoadingGuard<'_> {
    /// Record the outcome if this submission is still current.
    fn settle(self, result: &ReviewResult) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if inner.generation != self.generation {
            return false;
        }
        inner.state = match result {
            ReviewResult::Success { text } => DispatchState::Succeeded(text.clone()),
            ReviewResult::Failure { error } => DispatchState::Failed(error.clone()),
        };
        true
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut inner = self.inner.lock().unwrap_or_else(|p| p.into_inner());
        if inner.generation == self.generation && inner.state == DispatchState::Loading {
            inner.state = DispatchState::Idle;
        }
    }
}
