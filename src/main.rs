//! codereview: LLM-backed code review service and client.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use codereview::client;
use codereview::config;
use codereview::constants;
use codereview::env;
use codereview::progress;
use codereview::prompt;
use codereview::providers;
use codereview::server;

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use cli::args::{Cli, Command, OutputFormat, ReviewArgs, ServeArgs, TemplateAction};
use client::{Dispatcher, HttpTransport};
use config::Config;
use env::Env;
use progress::ProgressIndicator;
use providers::RetryPolicy;
use providers::rig::RigProvider;

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match (&cli.command, cli.verbose) {
        (_, true) => "debug",
        (Command::Serve(_), false) => "info",
        _ => "warn",
    };
    init_tracing(default_level);

    match cli.command {
        Command::Serve(args) => run_serve(args).await,
        Command::Review(args) => run_review(args).await,
        Command::Template { action } => run_template(action).await,
        Command::Version => run_version(),
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn load_config() -> Result<Config> {
    let cwd = std::env::current_dir().context("failed to determine working directory")?;
    Config::load(Some(&cwd), &Env::real()).context("failed to load configuration")
}

/// Print detailed version and build information.
fn run_version() -> Result<()> {
    use colored::Colorize;

    println!(
        "{} {}",
        constants::APP_NAME.bold(),
        constants::VERSION.green().bold()
    );
    println!("{}     {}", "target:".dimmed(), constants::TARGET);
    Ok(())
}

/// Run the review endpoint until Ctrl-C.
async fn run_serve(args: ServeArgs) -> Result<()> {
    let mut config = load_config()?;
    args.apply(&mut config);

    let template = prompt::resolve_template(config.template.path.as_deref())
        .await
        .context("failed to load prompt template")?;

    let provider = RigProvider::new(config.provider.clone())
        .context("failed to configure model provider")?;
    tracing::info!(
        provider = %provider.provider(),
        model = %config.provider.model,
        "model client ready"
    );

    let state = Arc::new(server::AppState::new(
        Arc::new(provider),
        template,
        config.server.clone(),
        RetryPolicy::from(&config.retry),
    ));

    let address = config.server.address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind {address}"))?;

    server::serve(listener, state)
        .await
        .context("review endpoint stopped with an error")
}

/// Submit code to a running endpoint and print the rendered review.
async fn run_review(args: ReviewArgs) -> Result<()> {
    let mut config = load_config()?;
    args.apply(&mut config);

    let code = read_code(args.file.as_deref()).await?;
    if code.trim().is_empty() {
        bail!("nothing to review: input is empty");
    }

    let transport = HttpTransport::new(
        &config.client.endpoint,
        Duration::from_secs(config.client.timeout_secs),
    )
    .context("failed to create HTTP client")?;

    let show_progress = !args.no_progress
        && args.format == OutputFormat::Terminal
        && std::io::stderr().is_terminal();
    if show_progress {
        cli::print_banner(transport.url());
    }

    let dispatcher = Dispatcher::new(transport);
    let indicator = ProgressIndicator::start("Reviewing…", show_progress);
    let outcome = dispatcher.submit(&code).await;
    let result = match outcome {
        Ok(result) => result,
        Err(e) => {
            indicator.abandon().await;
            return Err(e).context("review did not complete");
        }
    };
    indicator.finish(&result).await;

    print!("{}", args.format.render(&result));

    if !result.is_success() {
        bail!("review failed");
    }
    Ok(())
}

async fn read_code(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) if path != Path::new("-") => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display())),
        _ => {
            let mut code = String::new();
            tokio::io::stdin()
                .read_to_string(&mut code)
                .await
                .context("failed to read code from stdin")?;
            Ok(code)
        }
    }
}

/// Show or validate prompt templates.
async fn run_template(action: TemplateAction) -> Result<()> {
    use colored::Colorize;

    match action {
        TemplateAction::Show { template } => {
            let selector: Option<PathBuf> = match template {
                Some(t) => Some(t),
                None => load_config()?.template.path,
            };
            let template = prompt::resolve_template(selector.as_deref())
                .await
                .context("failed to load prompt template")?;
            let meta = &template.meta;
            println!(
                "  {} {}  {}",
                meta.name.bold(),
                format!("v{}", meta.version).green(),
                meta.description.dimmed(),
            );
            println!("         {}  {}", "fingerprint:".cyan(), template.fingerprint());
            if let Some(ref model) = meta.model {
                println!("         {}  {model}", "model:".cyan());
            }
            println!();
            println!("{}", template.system_instruction);
            Ok(())
        }
        TemplateAction::Validate { file } => {
            let content = tokio::fs::read_to_string(&file)
                .await
                .with_context(|| format!("failed to read {}", file.display()))?;

            match prompt::parse_template(&content) {
                Ok(template) => {
                    let meta = &template.meta;
                    println!(
                        "  {} {} {}  {}",
                        "✔".green().bold(),
                        meta.name.bold(),
                        format!("v{}", meta.version).green(),
                        meta.description.dimmed(),
                    );
                    if let Some(ref model) = meta.model {
                        println!("         {}  {model}", "model:".cyan());
                    }
                    println!(
                        "         {}  {} chars",
                        "instruction:".cyan(),
                        template.system_instruction.len()
                    );
                    Ok(())
                }
                Err(e) => {
                    bail!("{} {}", "✖".red().bold(), format!("Invalid template: {e}").red());
                }
            }
        }
    }
}
