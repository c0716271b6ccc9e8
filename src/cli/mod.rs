//! CLI command definitions and argument parsing.
//!
//! Uses clap derive macros for ergonomic argument definitions.

pub mod args;

/// Banner with ANSI styling for clap help output.
pub const BANNER_STYLED: &str =
    "\x1b[1mcodereview\x1b[0m \x1b[2m· LLM-backed code review service and client\x1b[0m";

/// Print the banner and target endpoint to stderr.
pub fn print_banner(endpoint: &str) {
    use colored::Colorize;
    use std::io::Write;
    let stderr = std::io::stderr();
    let mut handle = stderr.lock();
    let _ = writeln!(handle);
    let _ = writeln!(
        handle,
        "  {} {}",
        "codereview".bold(),
        format!("· {endpoint}").dimmed(),
    );
    let _ = writeln!(handle);
    let _ = handle.flush();
}
