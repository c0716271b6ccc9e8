//! Raw Markdown renderer, for piping into other tools.

use crate::models::ReviewResult;
use crate::output::OutputRenderer;

pub struct MarkdownRenderer;

impl OutputRenderer for MarkdownRenderer {
    fn render(&self, result: &ReviewResult) -> String {
        match result {
            ReviewResult::Success { text } => {
                let mut out = text.clone();
                if !out.ends_with('\n') {
                    out.push('\n');
                }
                out
            }
            ReviewResult::Failure { error } => format!("> ⚠️ {error}\n"),
        }
    }
}
