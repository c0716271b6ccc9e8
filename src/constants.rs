//! App-wide constants.
//!
//! Centralises the tool name, config paths, environment variable names,
//! routes and user-facing messages so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "codereview";

/// Crate version baked in at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Compilation target triple, exported by `build.rs`.
pub const TARGET: &str = env!("TARGET");

/// Local config filename (e.g. `.codereview.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".codereview.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "codereview";

// ── HTTP surface ────────────────────────────────────────────────────

/// Primary review route.
pub const REVIEW_ROUTE: &str = "/ai/get-review";

/// Short alias of [`REVIEW_ROUTE`].
pub const REVIEW_ROUTE_ALIAS: &str = "/review";

/// Liveness route.
pub const HEALTH_ROUTE: &str = "/health";

/// Content type of a successful review body.
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown; charset=utf-8";

// ── Messages ────────────────────────────────────────────────────────

/// Shown by the client for any transport-level failure.
pub const UNREACHABLE_MESSAGE: &str = "Unable to connect to review service.";

/// Returned by the endpoint when the provider call fails.
pub const UPSTREAM_FAILED_MESSAGE: &str = "the review service is unavailable";

/// Returned by the endpoint when the provider call exceeds the deadline.
pub const UPSTREAM_TIMEOUT_MESSAGE: &str = "the review service timed out";

// ── Environment variable names ──────────────────────────────────────

pub const ENV_PROVIDER: &str = "CODEREVIEW_PROVIDER";
pub const ENV_MODEL: &str = "CODEREVIEW_MODEL";
pub const ENV_API_KEY: &str = "CODEREVIEW_API_KEY";
pub const ENV_BASE_URL: &str = "CODEREVIEW_BASE_URL";
pub const ENV_BIND: &str = "CODEREVIEW_BIND";
pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "CODEREVIEW_ALLOWED_ORIGINS";
pub const ENV_TIMEOUT_SECS: &str = "CODEREVIEW_TIMEOUT_SECS";
pub const ENV_TEMPLATE: &str = "CODEREVIEW_TEMPLATE";
pub const ENV_ENDPOINT: &str = "CODEREVIEW_ENDPOINT";
