//! Clap argument types and config overrides.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use codereview::config::Config;
use codereview::models::ReviewResult;
use codereview::output::{JsonRenderer, MarkdownRenderer, OutputRenderer, TerminalRenderer};

/// LLM-backed code review service and client.
#[derive(Parser, Debug)]
#[command(
    name = "codereview",
    version = codereview::constants::VERSION,
    about = super::BANNER_STYLED,
)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Run the review endpoint.
    Serve(ServeArgs),

    /// Submit code to a running endpoint and print the review.
    Review(ReviewArgs),

    /// Inspect or validate prompt templates.
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Print version and build information.
    Version,
}

/// Arguments for the `serve` subcommand.
#[derive(Parser, Debug, Default)]
pub struct ServeArgs {
    /// Address to bind (default: 127.0.0.1).
    #[arg(long)]
    pub bind: Option<String>,

    /// Port to listen on (default: 3000, or $PORT).
    #[arg(long, short = 'p')]
    pub port: Option<u16>,

    /// Comma-separated browser origins allowed to call the endpoint.
    #[arg(long, value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// Prompt template: a built-in name or a markdown file path.
    #[arg(long)]
    pub template: Option<PathBuf>,

    /// Per-request upstream timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Model identifier passed to the provider.
    #[arg(long)]
    pub model: Option<String>,
}

impl ServeArgs {
    /// Apply flags on top of the layered configuration. Flags win.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref bind) = self.bind {
            config.server.bind = bind.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if !self.allowed_origins.is_empty() {
            config.server.allowed_origins = self
                .allowed_origins
                .iter()
                .map(|o| o.trim().to_string())
                .filter(|o| !o.is_empty())
                .collect();
        }
        if let Some(ref template) = self.template {
            config.template.path = Some(template.clone());
        }
        if let Some(secs) = self.timeout_secs.filter(|&s| s > 0) {
            config.server.request_timeout_secs = secs;
        }
        if let Some(ref model) = self.model {
            config.provider.model = model.clone();
        }
    }
}

/// Arguments for the `review` subcommand.
#[derive(Parser, Debug)]
pub struct ReviewArgs {
    /// Source file to review. Reads stdin when omitted.
    pub file: Option<PathBuf>,

    /// Base URL of the review endpoint (default: http://localhost:3000).
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Client-side timeout in seconds.
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Output format.
    #[arg(long, default_value = "terminal")]
    pub format: OutputFormat,

    /// Disable the progress spinner.
    #[arg(long, default_value_t = false)]
    pub no_progress: bool,
}

impl ReviewArgs {
    /// Apply flags on top of the layered configuration. Flags win.
    pub fn apply(&self, config: &mut Config) {
        if let Some(ref endpoint) = self.endpoint {
            config.client.endpoint = endpoint.clone();
        }
        if let Some(secs) = self.timeout_secs.filter(|&s| s > 0) {
            config.client.timeout_secs = secs;
        }
    }
}

/// Template subcommands.
#[derive(clap::Subcommand, Debug)]
pub enum TemplateAction {
    /// Print a template (default: the configured or built-in one).
    Show {
        /// Built-in name or markdown file path.
        template: Option<PathBuf>,
    },
    /// Check that a template file parses.
    Validate {
        /// Path to the template markdown file.
        file: PathBuf,
    },
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Markdown,
    Json,
}

impl OutputFormat {
    /// Render a review outcome using the renderer for this format.
    pub fn render(&self, result: &ReviewResult) -> String {
        match self {
            OutputFormat::Terminal => TerminalRenderer.render(result),
            OutputFormat::Markdown => MarkdownRenderer.render(result),
            OutputFormat::Json => JsonRenderer.render(result),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_serve_flags() {
        let cli = Cli::parse_from([
            "codereview",
            "serve",
            "--port",
            "8080",
            "--allowed-origins",
            "http://a.test,http://b.test",
        ]);
        let Command::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.port, Some(8080));
        assert_eq!(args.allowed_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn serve_flags_override_config() {
        let mut config = Config::default();
        let args = ServeArgs {
            bind: Some("0.0.0.0".into()),
            port: Some(9000),
            allowed_origins: vec![" http://ui.test ".into(), "".into()],
            template: Some(PathBuf::from("custom.md")),
            timeout_secs: Some(5),
            model: Some("gemini-2.5-pro".into()),
        };
        args.apply(&mut config);

        assert_eq!(config.server.address(), "0.0.0.0:9000");
        assert_eq!(config.server.allowed_origins, vec!["http://ui.test"]);
        assert_eq!(config.template.path, Some(PathBuf::from("custom.md")));
        assert_eq!(config.server.request_timeout_secs, 5);
        assert_eq!(config.provider.model, "gemini-2.5-pro");
    }

    #[test]
    fn empty_serve_flags_keep_config() {
        let mut config = Config::default();
        let before = config.server.address();
        ServeArgs::default().apply(&mut config);
        assert_eq!(config.server.address(), before);
        assert_eq!(
            config.server.allowed_origins,
            Config::default().server.allowed_origins
        );
    }

    #[test]
    fn parse_review_defaults() {
        let cli = Cli::parse_from(["codereview", "review", "sum.js"]);
        let Command::Review(args) = cli.command else {
            panic!("expected review");
        };
        assert_eq!(args.file, Some(PathBuf::from("sum.js")));
        assert_eq!(args.format, OutputFormat::Terminal);
        assert!(!args.no_progress);
    }

    #[test]
    fn review_endpoint_flag_overrides_config() {
        let mut config = Config::default();
        let cli = Cli::parse_from([
            "codereview",
            "review",
            "--endpoint",
            "http://review.internal:8080",
            "--format",
            "json",
        ]);
        let Command::Review(args) = cli.command else {
            panic!("expected review");
        };
        args.apply(&mut config);
        assert_eq!(config.client.endpoint, "http://review.internal:8080");
        assert_eq!(args.format, OutputFormat::Json);
    }

    #[test]
    fn zero_timeouts_are_ignored() {
        let mut config = Config::default();
        let cli = Cli::parse_from(["codereview", "review", "--timeout-secs", "0"]);
        let Command::Review(args) = cli.command else {
            panic!("expected review");
        };
        args.apply(&mut config);
        assert_eq!(config.client.timeout_secs, Config::default().client.timeout_secs);

        ServeArgs {
            timeout_secs: Some(0),
            ..ServeArgs::default()
        }
        .apply(&mut config);
        assert_eq!(
            config.server.request_timeout_secs,
            Config::default().server.request_timeout_secs
        );
    }

    #[test]
    fn output_format_render_terminal() {
        let output = OutputFormat::Terminal.render(&ReviewResult::Success {
            text: "### 1. EXECUTIVE SUMMARY".into(),
        });
        assert!(output.contains("### 1. EXECUTIVE SUMMARY"));
    }

    #[test]
    fn output_format_render_json() {
        let output = OutputFormat::Json.render(&ReviewResult::Failure {
            error: "down".into(),
        });
        assert!(output.contains("\"ok\": false"));
    }

    #[test]
    fn output_format_render_markdown() {
        let output = OutputFormat::Markdown.render(&ReviewResult::Success {
            text: "plain".into(),
        });
        assert_eq!(output, "plain\n");
    }
}
