//! codereview: LLM-backed code review service and client (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod client;
pub mod config;
pub mod constants;
pub mod env;
pub mod models;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod providers;
pub mod server;
