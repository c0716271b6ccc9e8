//! Wire types exchanged between the client and the review endpoint.

use serde::{Deserialize, Serialize};

/// Body of `POST /ai/get-review`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewRequest {
    /// Source code to review, any language.
    pub code: String,
}

impl ReviewRequest {
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// JSON body of every non-200 response from the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Outcome of one review round trip.
///
/// On the wire a success is the raw Markdown body and a failure is an
/// [`ErrorBody`]; this enum is what callers see after decoding either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewResult {
    Success { text: String },
    Failure { error: String },
}

impl ReviewResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ReviewResult::Success { .. })
    }
}
