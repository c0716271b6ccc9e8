//! Built-in prompt template registry.
//!
//! Templates are embedded via `include_str!` so they ship with the binary.

use crate::models::PromptTemplate;
use crate::prompt::parser;

const REVIEWER_MD: &str = include_str!("reviewer.md");

/// Name of the template used when none is configured.
pub const DEFAULT_TEMPLATE: &str = "reviewer";

/// List of all built-in template names.
const BUILTIN_NAMES: &[&str] = &[DEFAULT_TEMPLATE];

/// Get a built-in template by name.
pub fn get_builtin(name: &str) -> Option<PromptTemplate> {
    let md = match name {
        DEFAULT_TEMPLATE => REVIEWER_MD,
        _ => return None,
    };

    parser::parse_template(md).ok()
}

/// List all available built-in template names.
pub fn list_builtin_names() -> Vec<&'static str> {
    BUILTIN_NAMES.to_vec()
}
