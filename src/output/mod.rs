//! Output renderers: styled terminal Markdown, raw Markdown, JSON.

pub mod json;
pub mod markdown;
pub mod terminal;

use crate::models::ReviewResult;

pub use json::JsonRenderer;
pub use markdown::MarkdownRenderer;
pub use terminal::TerminalRenderer;

/// Trait for rendering a review outcome to an output format.
pub trait OutputRenderer {
    /// Render the outcome to a string.
    fn render(&self, result: &ReviewResult) -> String;
}
