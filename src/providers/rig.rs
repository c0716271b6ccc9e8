//! rig-core integration for LLM-backed code review.
//!
//! Uses rig-core's provider clients and Agent abstraction for multi-provider
//! support. Currently supports: Anthropic, OpenAI, Cohere, Gemini, Perplexity,
//! DeepSeek, xAI, Groq, and any OpenAI-compatible API.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

use crate::config::ProviderConfig;
use crate::models::{CompletionRequest, ProviderName};

use super::{ModelClient, ProviderError};

/// Maximum tokens per LLM completion response.
///
/// The review template asks for ten sections with code samples; thinking
/// models (e.g. Gemini 2.5) also spend part of the budget on reasoning.
const MAX_TOKENS: u64 = 65536;

/// Build a plain agent from a rig-core client and prompt it once.
///
/// Always sets `max_tokens`: without it some providers (e.g. Gemini)
/// default to a low limit that truncates the review.
macro_rules! prompt_once {
    ($client:expr, $model:expr, $system:expr, $user:expr, $label:expr) => {{
        let agent = $client
            .agent($model)
            .preamble($system)
            .temperature(0.2)
            .max_tokens(MAX_TOKENS)
            .build();
        agent
            .prompt($user)
            .await
            .map_err(|e| ProviderError::Api(format!("{} API error: {e}", $label)))
    }};
}

/// Create a rig-core client using the `Client::new(api_key)` convention.
macro_rules! new_client {
    ($provider_mod:path, $api_key:expr, $label:expr) => {{
        <$provider_mod>::new($api_key).map_err(|e| {
            ProviderError::Api(format!("failed to create {} client: {e}", $label))
        })
    }};
}

/// rig-core based model client.
///
/// Holds only configuration; a provider client is built per call so no
/// connection or conversation state outlives a request.
pub struct RigProvider {
    config: ProviderConfig,
}

impl RigProvider {
    /// Create a new RigProvider with the given configuration.
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        if config.api_key.is_none() {
            return Err(ProviderError::NotConfigured(format!(
                "no API key found for provider '{}'. Set {} or {}.",
                config.name,
                crate::constants::ENV_API_KEY,
                config.name.api_key_env_var(),
            )));
        }
        if config.name == ProviderName::OpenAICompatible && config.base_url.is_none() {
            return Err(ProviderError::NotConfigured(
                "openai-compatible provider requires base_url to be set".to_string(),
            ));
        }
        Ok(Self { config })
    }

    /// Provider selected by the configuration.
    pub fn provider(&self) -> ProviderName {
        self.config.name
    }

    /// Build an OpenAI-style client, optionally with a custom base URL.
    fn build_openai_client(
        &self,
        api_key: &str,
    ) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(api_key);
        if let Some(ref base_url) = self.config.base_url {
            builder = builder.base_url(base_url);
        }
        let client: providers::openai::CompletionsClient = builder.build().map_err(|e| {
            ProviderError::Api(format!(
                "failed to create {} client: {e}",
                self.config.name.label()
            ))
        })?;
        Ok(client)
    }

    /// Get the API key or return an error.
    fn api_key(&self) -> Result<&str, ProviderError> {
        self.config
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("missing API key".to_string()))
    }

    /// Make a completion call through rig-core and return the raw response text.
    async fn call_rig(
        &self,
        model: &str,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, ProviderError> {
        let api_key = self.api_key()?;
        let label = self.config.name.label();

        match self.config.name {
            ProviderName::Anthropic => {
                let client: providers::anthropic::Client = providers::anthropic::Client::builder()
                    .api_key(api_key)
                    .build()
                    .map_err(|e| {
                        ProviderError::Api(format!("failed to create Anthropic client: {e}"))
                    })?;
                prompt_once!(client, model, system_prompt, user_prompt, label)
            }
            ProviderName::OpenAI | ProviderName::OpenAICompatible => {
                let client = self.build_openai_client(api_key)?;
                prompt_once!(client, model, system_prompt, user_prompt, label)
            }
            ProviderName::Cohere => {
                let client = new_client!(providers::cohere::Client, api_key, label)?;
                prompt_once!(client, model, system_prompt, user_prompt, label)
            }
            ProviderName::Gemini => {
                let client = new_client!(providers::gemini::Client, api_key, label)?;
                prompt_once!(client, model, system_prompt, user_prompt, label)
            }
            ProviderName::Perplexity => {
                let client = new_client!(providers::perplexity::Client, api_key, label)?;
                prompt_once!(client, model, system_prompt, user_prompt, label)
            }
            ProviderName::DeepSeek => {
                let client = new_client!(providers::deepseek::Client, api_key, label)?;
                prompt_once!(client, model, system_prompt, user_prompt, label)
            }
            ProviderName::XAI => {
                let client = new_client!(providers::xai::Client, api_key, label)?;
                prompt_once!(client, model, system_prompt, user_prompt, label)
            }
            ProviderName::Groq => {
                let client = new_client!(providers::groq::Client, api_key, label)?;
                prompt_once!(client, model, system_prompt, user_prompt, label)
            }
        }
    }
}

#[async_trait]
impl ModelClient for RigProvider {
    async fn generate(&self, request: &CompletionRequest) -> Result<String, ProviderError> {
        let model = request.model.as_deref().unwrap_or(&self.config.model);

        tracing::debug!(
            provider = %self.config.name,
            model,
            template = %request.template_name,
            template_version = request.template_version,
            "calling provider"
        );

        let text = self
            .call_rig(model, &request.system_instruction, &request.user_content)
            .await?;
        non_empty(text)
    }
}

/// Reject blank completions; a review with no text is a malformed response.
fn non_empty(text: String) -> Result<String, ProviderError> {
    if text.trim().is_empty() {
        Err(ProviderError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(name: ProviderName, api_key: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            name,
            model: "gemini-2.5-flash".to_string(),
            base_url: None,
            api_key: api_key.map(str::to_string),
        }
    }

    #[test]
    fn new_provider_missing_api_key() {
        let result = RigProvider::new(config(ProviderName::Gemini, None));
        match result {
            Err(e) => {
                let msg = e.to_string();
                assert!(msg.contains("API key"), "got: {msg}");
                assert!(msg.contains("GEMINI_API_KEY"), "got: {msg}");
            }
            Ok(_) => panic!("expected error for missing API key"),
        }
    }

    #[test]
    fn new_provider_with_api_key() {
        let provider = RigProvider::new(config(ProviderName::Gemini, Some("gm-test"))).unwrap();
        assert_eq!(provider.provider(), ProviderName::Gemini);
    }

    #[test]
    fn openai_compatible_requires_base_url() {
        let result = RigProvider::new(config(ProviderName::OpenAICompatible, Some("key")));
        match result {
            Err(e) => assert!(e.to_string().contains("base_url"), "got: {e}"),
            Ok(_) => panic!("expected error for missing base_url"),
        }
    }

    #[test]
    fn openai_compatible_with_base_url() {
        let mut cfg = config(ProviderName::OpenAICompatible, Some("key"));
        cfg.base_url = Some("http://localhost:11434/v1".to_string());
        assert!(RigProvider::new(cfg).is_ok());
    }

    #[test]
    fn blank_completion_is_an_error() {
        assert!(matches!(
            non_empty("  \n".to_string()),
            Err(ProviderError::EmptyResponse)
        ));
        assert_eq!(non_empty("### 1.".to_string()).unwrap(), "### 1.");
    }
}
