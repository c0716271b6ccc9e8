//! Shared types used across all modules.
//!
//! This module defines the wire types of the review endpoint, the
//! completion request handed to the model client, and the provider
//! selection enum. Other modules import from here rather than reaching
//! into each other's internals.

pub mod review;
pub mod template;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use review::{ErrorBody, ReviewRequest, ReviewResult};
pub use template::{CompletionRequest, PromptTemplate, TemplateMeta};

/// Supported LLM provider backends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderName {
    Anthropic,
    #[serde(rename = "openai")]
    OpenAI,
    Cohere,
    #[default]
    Gemini,
    Perplexity,
    #[serde(rename = "deepseek")]
    DeepSeek,
    #[serde(rename = "xai")]
    XAI,
    Groq,
    /// Any OpenAI-compatible API (e.g. Ollama, Together, local servers).
    #[serde(rename = "openai-compatible")]
    OpenAICompatible,
}

impl fmt::Display for ProviderName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderName::Anthropic => "anthropic",
            ProviderName::OpenAI => "openai",
            ProviderName::Cohere => "cohere",
            ProviderName::Gemini => "gemini",
            ProviderName::Perplexity => "perplexity",
            ProviderName::DeepSeek => "deepseek",
            ProviderName::XAI => "xai",
            ProviderName::Groq => "groq",
            ProviderName::OpenAICompatible => "openai-compatible",
        };
        f.write_str(name)
    }
}

impl std::str::FromStr for ProviderName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(ProviderName::Anthropic),
            "openai" => Ok(ProviderName::OpenAI),
            "cohere" => Ok(ProviderName::Cohere),
            "gemini" | "google" => Ok(ProviderName::Gemini),
            "perplexity" => Ok(ProviderName::Perplexity),
            "deepseek" => Ok(ProviderName::DeepSeek),
            "xai" => Ok(ProviderName::XAI),
            "groq" => Ok(ProviderName::Groq),
            "openai-compatible" => Ok(ProviderName::OpenAICompatible),
            other => Err(format!(
                "unsupported provider: '{other}'. Supported: anthropic, openai, cohere, \
                 gemini, perplexity, deepseek, xai, groq, openai-compatible"
            )),
        }
    }
}

impl ProviderName {
    /// Returns the provider-specific environment variable name for the API key.
    ///
    /// These match the env var names used by rig-core's `from_env()` implementations.
    pub fn api_key_env_var(self) -> &'static str {
        match self {
            ProviderName::Anthropic => "ANTHROPIC_API_KEY",
            ProviderName::OpenAI | ProviderName::OpenAICompatible => "OPENAI_API_KEY",
            ProviderName::Cohere => "COHERE_API_KEY",
            ProviderName::Gemini => "GEMINI_API_KEY",
            ProviderName::Perplexity => "PERPLEXITY_API_KEY",
            ProviderName::DeepSeek => "DEEPSEEK_API_KEY",
            ProviderName::XAI => "XAI_API_KEY",
            ProviderName::Groq => "GROQ_API_KEY",
        }
    }

    /// Human-readable label used in error messages and logs.
    pub fn label(self) -> &'static str {
        match self {
            ProviderName::Anthropic => "Anthropic",
            ProviderName::OpenAI => "OpenAI",
            ProviderName::Cohere => "Cohere",
            ProviderName::Gemini => "Gemini",
            ProviderName::Perplexity => "Perplexity",
            ProviderName::DeepSeek => "DeepSeek",
            ProviderName::XAI => "xAI",
            ProviderName::Groq => "Groq",
            ProviderName::OpenAICompatible => "OpenAI-compatible",
        }
    }
}
