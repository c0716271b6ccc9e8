//! Progress reporting for terminal output.
//!
//! Shows a single live spinner line on stderr while a review is in flight
//! and replaces it with a colored checkmark or failure mark once the
//! review settles. Silenced with `--no-progress` or when stderr is not a
//! terminal.

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use colored::Colorize;
use tokio::task::JoinHandle;

use crate::models::ReviewResult;

const FRAMES: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
const TICK: Duration = Duration::from_millis(80);

/// Live "reviewing…" indicator for one submission.
pub struct ProgressIndicator {
    running: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
    started: Instant,
    /// If false, all output is suppressed.
    enabled: bool,
}

impl ProgressIndicator {
    /// Start the spinner. Must be called inside a tokio runtime when
    /// `enabled` is true.
    pub fn start(label: &str, enabled: bool) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let ticker = enabled.then(|| {
            let running = Arc::clone(&running);
            let label = label.to_string();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(TICK);
                let mut tick = 0usize;
                while running.load(Ordering::Acquire) {
                    interval.tick().await;
                    Self::draw(&frame_line(tick, &label));
                    tick = tick.wrapping_add(1);
                }
            })
        });

        Self {
            running,
            ticker,
            started: Instant::now(),
            enabled,
        }
    }

    /// Whether the spinner is still ticking.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Stop the spinner, clear its line, and print the outcome summary.
    pub async fn finish(mut self, result: &ReviewResult) {
        self.stop().await;
        if !self.enabled {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f32();
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        let _ = match result {
            ReviewResult::Success { .. } => writeln!(
                handle,
                "  {} {} {}",
                "✔".green().bold(),
                "Review complete".green(),
                format!("({elapsed:.1}s)").dimmed()
            ),
            ReviewResult::Failure { .. } => writeln!(
                handle,
                "  {} {} {}",
                "✖".red().bold(),
                "Review failed".red(),
                format!("({elapsed:.1}s)").dimmed()
            ),
        };
        let _ = writeln!(handle);
    }

    /// Stop the spinner and clear its line without a summary.
    pub async fn abandon(mut self) {
        self.stop().await;
    }

    async fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.await;
            Self::clear_line();
        }
    }

    fn draw(line: &str) {
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        let _ = write!(handle, "\r\x1b[2K{line}");
        let _ = handle.flush();
    }

    /// Return to column zero and clear the spinner line.
    fn clear_line() {
        let stderr = io::stderr();
        let mut handle = stderr.lock();
        let _ = write!(handle, "\r\x1b[2K");
        let _ = handle.flush();
    }
}

impl Drop for ProgressIndicator {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

fn frame_line(tick: usize, label: &str) -> String {
    let frame = FRAMES[tick % FRAMES.len()];
    format!("  {} {}", frame.cyan().bold(), label.cyan())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn indicator_disabled_no_panic() {
        let indicator = ProgressIndicator::start("Reviewing…", false);
        assert!(indicator.is_running());
        indicator
            .finish(&ReviewResult::Success {
                text: "ok".into(),
            })
            .await;
    }

    #[tokio::test]
    async fn abandon_stops_the_ticker() {
        let indicator = ProgressIndicator::start("Reviewing…", false);
        let running = Arc::clone(&indicator.running);
        indicator.abandon().await;
        assert!(!running.load(Ordering::Acquire));
    }

    #[test]
    fn frames_cycle() {
        assert!(frame_line(0, "Reviewing").contains(FRAMES[0]));
        assert!(frame_line(FRAMES.len() + 1, "Reviewing").contains(FRAMES[1]));
        assert!(frame_line(3, "Reviewing").contains("Reviewing"));
    }
}
