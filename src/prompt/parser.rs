//! Markdown + YAML frontmatter parser for prompt templates.
//!
//! Uses `serde_yaml_ng` for the frontmatter so templates can carry
//! structured metadata next to the instruction text.

use crate::models::template::{PromptTemplate, TemplateMeta};

use super::TemplateError;

/// Parse a markdown file with YAML frontmatter into a [`PromptTemplate`].
///
/// Expected format:
/// ```markdown
/// ---
/// name: reviewer
/// version: 2
/// description: Strict reviewer
/// model: gemini-2.5-pro
/// ---
///
/// System instruction here...
/// ```
pub fn parse_template(content: &str) -> Result<PromptTemplate, TemplateError> {
    let (frontmatter, body) = split_frontmatter(content)?;
    let meta: TemplateMeta = serde_yaml_ng::from_str(frontmatter)
        .map_err(|e| TemplateError::Parse(format!("invalid frontmatter: {e}")))?;

    if meta.name.trim().is_empty() {
        return Err(TemplateError::Parse("template name must not be empty".into()));
    }

    let system_instruction = body.trim();
    if system_instruction.is_empty() {
        return Err(TemplateError::Parse(format!(
            "template '{}' has an empty instruction body",
            meta.name
        )));
    }

    Ok(PromptTemplate {
        meta,
        system_instruction: system_instruction.to_string(),
    })
}

/// Split content into YAML frontmatter and markdown body.
fn split_frontmatter(content: &str) -> Result<(&str, &str), TemplateError> {
    let content = content.trim_start();

    let Some(after_first) = content.strip_prefix("---") else {
        return Err(TemplateError::Parse(
            "template must start with YAML frontmatter (---)".into(),
        ));
    };

    let end = after_first.find("\n---").ok_or_else(|| {
        TemplateError::Parse("unterminated YAML frontmatter (missing closing ---)".into())
    })?;

    Ok((after_first[..end].trim(), &after_first[end + 4..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid_template() {
        let content = r#"---
name: strict
version: 3
description: Very strict reviewer
model: gemini-2.5-pro
---

You are a strict reviewer.

Flag everything.
"#;
        let template = parse_template(content).unwrap();
        assert_eq!(template.meta.name, "strict");
        assert_eq!(template.meta.version, 3);
        assert_eq!(template.meta.description, "Very strict reviewer");
        assert_eq!(template.meta.model.as_deref(), Some("gemini-2.5-pro"));
        assert_eq!(
            template.system_instruction,
            "You are a strict reviewer.\n\nFlag everything."
        );
    }

    #[test]
    fn parse_minimal_template() {
        let template = parse_template("---\nname: t\nversion: 1\n---\nReview.").unwrap();
        assert!(template.meta.model.is_none());
        assert!(template.meta.description.is_empty());
    }

    #[test]
    fn missing_frontmatter() {
        let err = parse_template("Just an instruction").unwrap_err();
        assert!(err.to_string().contains("frontmatter"), "got: {err}");
    }

    #[test]
    fn unterminated_frontmatter() {
        let err = parse_template("---\nname: t\nversion: 1\nReview.").unwrap_err();
        assert!(err.to_string().contains("unterminated"), "got: {err}");
    }

    #[test]
    fn missing_version() {
        assert!(parse_template("---\nname: t\n---\nReview.").is_err());
    }

    #[test]
    fn empty_body_is_rejected() {
        let err = parse_template("---\nname: t\nversion: 1\n---\n   \n").unwrap_err();
        assert!(err.to_string().contains("empty instruction"), "got: {err}");
    }

    #[test]
    fn blank_name_is_rejected() {
        assert!(parse_template("---\nname: \"  \"\nversion: 1\n---\nReview.").is_err());
    }

    #[test]
    fn horizontal_rules_in_body_survive() {
        let content = "---\nname: t\nversion: 1\n---\nPart one.\n\n---\n\nPart two.";
        let template = parse_template(content).unwrap();
        assert!(template.system_instruction.contains("Part two."));
    }
}
