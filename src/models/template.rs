//! Prompt template and completion request types.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// A parsed prompt template from markdown+YAML frontmatter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    /// Metadata from the YAML frontmatter.
    pub meta: TemplateMeta,
    /// The system instruction (markdown body after frontmatter).
    pub system_instruction: String,
}

/// Metadata from the YAML frontmatter of a template file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateMeta {
    /// Unique name of the template.
    pub name: String,
    /// Monotonic template revision. Bump when the output contract changes.
    pub version: u32,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Optional model override for reviews built from this template.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

impl PromptTemplate {
    /// Short content hash of the system instruction, for logs and `/health`.
    ///
    /// Two deployments reporting the same name and version but different
    /// fingerprints are running edited copies of the template.
    pub fn fingerprint(&self) -> String {
        let digest = Sha256::digest(self.system_instruction.as_bytes());
        hex::encode(&digest[..6])
    }
}

/// Payload handed to a model client: fixed instruction plus user content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    pub system_instruction: String,
    pub user_content: String,
    pub template_name: String,
    pub template_version: u32,
    /// Model override carried over from the template, if any.
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(body: &str) -> PromptTemplate {
        PromptTemplate {
            meta: TemplateMeta {
                name: "t".into(),
                version: 1,
                description: String::new(),
                model: None,
            },
            system_instruction: body.into(),
        }
    }

    #[test]
    fn fingerprint_is_stable_and_short() {
        let a = template("You are a reviewer.");
        assert_eq!(a.fingerprint(), template("You are a reviewer.").fingerprint());
        assert_eq!(a.fingerprint().len(), 12);
    }

    #[test]
    fn fingerprint_changes_with_body() {
        assert_ne!(
            template("one").fingerprint(),
            template("two").fingerprint()
        );
    }
}
