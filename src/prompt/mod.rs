//! Prompt template loading and completion request assembly.
//!
//! The system instruction lives in a versioned markdown template rather
//! than in code: a built-in copy ships with the binary and a file on disk
//! can replace it without a rebuild.

pub mod builtin;
pub mod parser;

use std::path::Path;

use thiserror::Error;

use crate::models::{CompletionRequest, PromptTemplate};

pub use builtin::DEFAULT_TEMPLATE;
pub use parser::parse_template;

/// Errors from template loading.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("prompt template not found: {0}")]
    NotFound(String),

    #[error("failed to read prompt template {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse prompt template: {0}")]
    Parse(String),
}

/// Pair the template's instruction with the caller's code.
///
/// Neither side is altered: the instruction is copied from the template
/// and `code` is forwarded byte for byte. Validation is the caller's job.
pub fn build(template: &PromptTemplate, code: &str) -> CompletionRequest {
    CompletionRequest {
        system_instruction: template.system_instruction.clone(),
        user_content: code.to_string(),
        template_name: template.meta.name.clone(),
        template_version: template.meta.version,
        model: template.meta.model.clone(),
    }
}

/// The template used when nothing is configured.
pub fn builtin_template() -> Result<PromptTemplate, TemplateError> {
    builtin::get_builtin(DEFAULT_TEMPLATE)
        .ok_or_else(|| TemplateError::NotFound(DEFAULT_TEMPLATE.to_string()))
}

/// Load a template from a markdown file.
pub async fn load_template(path: &Path) -> Result<PromptTemplate, TemplateError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| TemplateError::Read {
            path: path.display().to_string(),
            source: e,
        })?;
    parse_template(&content)
}

/// Resolve the configured template.
///
/// Resolution order:
/// 1. `None` → the built-in default
/// 2. A built-in name (e.g. `reviewer`) → that built-in
/// 3. Otherwise → treated as a file path
pub async fn resolve_template(selector: Option<&Path>) -> Result<PromptTemplate, TemplateError> {
    let Some(selector) = selector else {
        return builtin_template();
    };

    if let Some(name) = selector.to_str() {
        if let Some(template) = builtin::get_builtin(name) {
            return Ok(template);
        }
    }

    if !selector.exists() {
        return Err(TemplateError::NotFound(format!(
            "{} (built-in templates: {})",
            selector.display(),
            builtin::list_builtin_names().join(", ")
        )));
    }

    load_template(selector).await
}
