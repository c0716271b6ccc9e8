//! Configuration loading and layering.
//!
//! Handles `.codereview.toml` loading, environment variable resolution,
//! and CLI flag merging with proper priority ordering. Everything the
//! server needs (origins, credentials, template, deadlines) is resolved
//! once at startup from this single source.

pub mod loader;

pub use loader::{ClientConfig, Config, ConfigError, ProviderConfig, RetryConfig, ServerConfig};
