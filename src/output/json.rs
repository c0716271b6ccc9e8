//! JSON output renderer.
//!
//! Outputs `{"ok": true, "review": "..."}` or `{"ok": false, "error": "..."}`.

use crate::models::ReviewResult;
use crate::output::OutputRenderer;

/// JSON output renderer.
pub struct JsonRenderer;

impl OutputRenderer for JsonRenderer {
    fn render(&self, result: &ReviewResult) -> String {
        let output = match result {
            ReviewResult::Success { text } => serde_json::json!({ "ok": true, "review": text }),
            ReviewResult::Failure { error } => serde_json::json!({ "ok": false, "error": error }),
        };

        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}
