//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. CLI flags
//! 2. Environment variables
//! 3. `.codereview.toml` in the working directory
//! 4. `~/.config/codereview/config.toml` (global defaults)
//! 5. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::constants;
use crate::env::Env;
use crate::models::ProviderName;

/// Errors during config loading.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub retry: RetryConfig,
    pub template: TemplateConfig,
    pub client: ClientConfig,
}

/// Review endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    /// Browser origins allowed to call the endpoint. Exact match.
    pub allowed_origins: Vec<String>,
    /// Upper bound on one review, provider retries included.
    pub request_timeout_secs: u64,
    /// Largest accepted `code` payload, in bytes.
    pub max_code_bytes: usize,
    /// Outbound provider calls allowed in flight at once.
    pub max_concurrent_reviews: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
            allowed_origins: vec!["http://localhost:5173".to_string()],
            request_timeout_secs: 60,
            max_code_bytes: 100_000,
            max_concurrent_reviews: 16,
        }
    }
}

impl ServerConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// `bind:port` as accepted by `TcpListener::bind`.
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}

/// LLM provider configuration.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub name: ProviderName,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            name: ProviderName::Gemini,
            model: "gemini-2.5-flash".to_string(),
            base_url: None,
            api_key: None,
        }
    }
}

/// Retry policy for transient provider errors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

/// Prompt template selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateConfig {
    /// Built-in template name or path to a markdown template file.
    pub path: Option<PathBuf>,
}

/// Settings for the `review` client command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL of a running review endpoint.
    pub endpoint: String,
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:3000".to_string(),
            timeout_secs: 120,
        }
    }
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// Reads from global config, the local config in `work_dir`, then
    /// applies environment variable overrides.
    pub fn load(work_dir: Option<&Path>, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        // Layer 4: global config
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                let global = Self::load_file(&global_path)?;
                config.merge(global);
            }
        }

        // Layer 3: local config
        if let Some(dir) = work_dir {
            let local_path = dir.join(constants::CONFIG_FILENAME);
            if local_path.exists() {
                let local = Self::load_file(&local_path)?;
                config.merge(local);
            }
        }

        // Layer 2: environment variables
        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the global config file path.
    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one (other takes precedence for non-default values).
    fn merge(&mut self, other: Config) {
        let default_server = ServerConfig::default();
        if other.server.bind != default_server.bind {
            self.server.bind = other.server.bind;
        }
        if other.server.port != default_server.port {
            self.server.port = other.server.port;
        }
        if other.server.allowed_origins != default_server.allowed_origins {
            self.server.allowed_origins = other.server.allowed_origins;
        }
        if other.server.request_timeout_secs != default_server.request_timeout_secs {
            self.server.request_timeout_secs = other.server.request_timeout_secs;
        }
        if other.server.max_code_bytes != default_server.max_code_bytes {
            self.server.max_code_bytes = other.server.max_code_bytes;
        }
        if other.server.max_concurrent_reviews != default_server.max_concurrent_reviews {
            self.server.max_concurrent_reviews = other.server.max_concurrent_reviews;
        }

        let default_provider = ProviderConfig::default();
        if other.provider.name != default_provider.name {
            self.provider.name = other.provider.name;
        }
        if other.provider.model != default_provider.model {
            self.provider.model = other.provider.model;
        }
        if other.provider.base_url.is_some() {
            self.provider.base_url = other.provider.base_url;
        }
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }

        let default_retry = RetryConfig::default();
        if other.retry.max_retries != default_retry.max_retries {
            self.retry.max_retries = other.retry.max_retries;
        }
        if other.retry.initial_backoff_ms != default_retry.initial_backoff_ms {
            self.retry.initial_backoff_ms = other.retry.initial_backoff_ms;
        }
        if other.retry.max_backoff_ms != default_retry.max_backoff_ms {
            self.retry.max_backoff_ms = other.retry.max_backoff_ms;
        }

        if other.template.path.is_some() {
            self.template.path = other.template.path;
        }

        let default_client = ClientConfig::default();
        if other.client.endpoint != default_client.endpoint {
            self.client.endpoint = other.client.endpoint;
        }
        if other.client.timeout_secs != default_client.timeout_secs {
            self.client.timeout_secs = other.client.timeout_secs;
        }
    }

    /// Apply environment variable overrides.
    fn apply_env_vars(&mut self, env: &Env) {
        match env.parse::<ProviderName>(constants::ENV_PROVIDER) {
            Some(Ok(name)) => self.provider.name = name,
            Some(Err(raw)) => tracing::warn!(
                "ignoring invalid {} value: {raw}",
                constants::ENV_PROVIDER
            ),
            None => {}
        }
        if let Some(val) = env.get(constants::ENV_MODEL) {
            self.provider.model = val;
        }
        if let Some(val) = env.get(constants::ENV_BASE_URL) {
            self.provider.base_url = Some(val);
        }

        // Provider-specific API key resolution
        let api_key = env
            .get(constants::ENV_API_KEY)
            .or_else(|| env.get(self.provider.name.api_key_env_var()));
        if api_key.is_some() {
            self.provider.api_key = api_key;
        }

        if let Some(val) = env.get(constants::ENV_BIND) {
            self.server.bind = val;
        }
        match env.parse::<u16>(constants::ENV_PORT) {
            Some(Ok(port)) => self.server.port = port,
            Some(Err(raw)) => {
                tracing::warn!("ignoring invalid {} value: {raw}", constants::ENV_PORT)
            }
            None => {}
        }
        if let Some(origins) = env.list(constants::ENV_ALLOWED_ORIGINS) {
            self.server.allowed_origins = origins;
        }
        match env.parse::<u64>(constants::ENV_TIMEOUT_SECS) {
            Some(Ok(secs)) if secs > 0 => self.server.request_timeout_secs = secs,
            Some(_) => tracing::warn!(
                "ignoring invalid {} value (expected a positive number of seconds)",
                constants::ENV_TIMEOUT_SECS
            ),
            None => {}
        }

        if let Some(val) = env.get(constants::ENV_TEMPLATE) {
            self.template.path = Some(PathBuf::from(val));
        }
        if let Some(val) = env.get(constants::ENV_ENDPOINT) {
            self.client.endpoint = val;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.provider.name, ProviderName::Gemini);
        assert_eq!(config.provider.model, "gemini-2.5-flash");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.server.request_timeout(), Duration::from_secs(60));
        assert!(config.template.path.is_none());
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[server]
port = 8080
allowed_origins = ["https://review.example.com"]
request_timeout_secs = 30

[provider]
name = "openai"
model = "gpt-4o"

[retry]
max_retries = 4

[template]
path = "templates/strict.md"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://review.example.com"]
        );
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.server.max_code_bytes, 100_000);
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.retry.max_retries, 4);
        assert_eq!(config.retry.initial_backoff_ms, 500);
        assert_eq!(
            config.template.path,
            Some(PathBuf::from("templates/strict.md"))
        );
    }

    #[test]
    fn merge_overrides_non_default_values() {
        let mut base = Config::default();
        let mut other = Config::default();

        other.server.port = 9000;
        other.server.allowed_origins = vec!["https://a.test".to_string()];
        other.provider.name = ProviderName::Anthropic;
        other.provider.api_key = Some("sk-test".to_string());
        other.retry.max_retries = 0;
        other.template.path = Some(PathBuf::from("t.md"));
        other.client.endpoint = "http://review.internal".to_string();

        base.merge(other);

        assert_eq!(base.server.port, 9000);
        assert_eq!(base.server.allowed_origins, vec!["https://a.test"]);
        assert_eq!(base.provider.name, ProviderName::Anthropic);
        assert_eq!(base.provider.api_key.as_deref(), Some("sk-test"));
        assert_eq!(base.retry.max_retries, 0);
        assert_eq!(base.template.path, Some(PathBuf::from("t.md")));
        assert_eq!(base.client.endpoint, "http://review.internal");
    }

    #[test]
    fn merge_keeps_base_when_other_is_default() {
        let mut base = Config::default();
        base.server.port = 9000;
        base.provider.model = "gemini-2.5-pro".to_string();

        base.merge(Config::default());

        assert_eq!(base.server.port, 9000);
        assert_eq!(base.provider.model, "gemini-2.5-pro");
    }

    #[test]
    fn merge_retry_field_by_field() {
        let mut base: Config = toml::from_str("[retry]\ninitial_backoff_ms = 1500\n").unwrap();
        let local: Config = toml::from_str("[retry]\nmax_retries = 5\n").unwrap();

        base.merge(local);

        assert_eq!(base.retry.max_retries, 5);
        assert_eq!(base.retry.initial_backoff_ms, 1500);
        assert_eq!(base.retry.max_backoff_ms, RetryConfig::default().max_backoff_ms);
    }

    #[test]
    fn load_file_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid {{ toml").unwrap();

        let err = Config::load_file(&path).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn load_file_not_found() {
        let err = Config::load_file(Path::new("/tmp/codereview_not_exist.toml")).unwrap_err();
        assert!(err.to_string().contains("read"));
    }

    #[test]
    fn load_from_work_dir() {
        let env = Env::mock(Vec::<(&str, &str)>::new());
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".codereview.toml"),
            "[server]\nport = 4000\n",
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), &env).unwrap();
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn env_overrides_file() {
        let env = Env::mock([("PORT", "5000")]);
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(".codereview.toml"),
            "[server]\nport = 4000\n",
        )
        .unwrap();

        let config = Config::load(Some(dir.path()), &env).unwrap();
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn apply_env_vars_provider_and_key() {
        let env = Env::mock([
            ("CODEREVIEW_PROVIDER", "openai"),
            ("CODEREVIEW_API_KEY", "sk-env-test"),
            ("CODEREVIEW_MODEL", "gpt-4o-mini"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::OpenAI);
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-env-test"));
        assert_eq!(config.provider.model, "gpt-4o-mini");
    }

    #[test]
    fn apply_env_vars_provider_specific_key_fallback() {
        let env = Env::mock([("GEMINI_API_KEY", "gm-key")]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.api_key.as_deref(), Some("gm-key"));
    }

    #[test]
    fn apply_env_vars_origins_and_timeout() {
        let env = Env::mock([
            ("CODEREVIEW_ALLOWED_ORIGINS", "https://a.test, https://b.test"),
            ("CODEREVIEW_TIMEOUT_SECS", "15"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(
            config.server.allowed_origins,
            vec!["https://a.test", "https://b.test"]
        );
        assert_eq!(config.server.request_timeout_secs, 15);
    }

    #[test]
    fn apply_env_vars_invalid_values_are_ignored() {
        let env = Env::mock([
            ("CODEREVIEW_PROVIDER", "not-a-provider"),
            ("PORT", "eighty"),
            ("CODEREVIEW_TIMEOUT_SECS", "0"),
        ]);
        let mut config = Config::default();
        config.apply_env_vars(&env);
        assert_eq!(config.provider.name, ProviderName::Gemini);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.request_timeout_secs, 60);
    }

    #[test]
    fn debug_redacts_api_key() {
        let provider = ProviderConfig {
            api_key: Some("sk-secret".to_string()),
            ..ProviderConfig::default()
        };
        let debug = format!("{provider:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("REDACTED"));
    }
}
