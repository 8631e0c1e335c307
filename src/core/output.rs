//! Colored output and progress reporting
//!
//! Uses owo-colors for terminal colors and indicatif for progress bars.
//! Status chatter (`action`, `info`, `detail`) goes to stderr so that the
//! resolver's stdout carries nothing but its result. Warnings and errors
//! always print, even in quiet mode.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Standard spinner characters
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Standard tick interval for spinners
const TICK_INTERVAL_MS: u64 = 80;

const BYTES_TEMPLATE: &str =
    "     {spinner:.cyan} [{bar:30.cyan/dim}] {bytes}/{total_bytes} ({eta})";

static QUIET: AtomicBool = AtomicBool::new(false);

/// Suppress informational output for the rest of the process.
pub fn set_quiet(quiet: bool) {
    QUIET.store(quiet, Ordering::Relaxed);
}

fn quiet() -> bool {
    QUIET.load(Ordering::Relaxed)
}

/// Print an action header (blue, bold)
/// Example: "==> Splitting tools.txt"
pub fn action(message: &str) {
    if !quiet() {
        eprintln!("{} {}", "==>".blue().bold(), message.bold());
    }
}

/// Print a detail line (dimmed)
/// Example: "     downloading chisel_linux_amd64.gz"
pub fn detail(message: &str) {
    if !quiet() {
        eprintln!("     {}", message.dimmed());
    }
}

/// Print an info message (cyan)
pub fn info(message: &str) {
    if !quiet() {
        eprintln!("{} {}", "::".cyan(), message);
    }
}

/// Print a success message (green) on stdout
pub fn success(message: &str) {
    if !quiet() {
        println!("{} {}", "==>".green().bold(), message.green());
    }
}

/// Print one category line of a split summary
pub fn list_item(name: &str, status: &str) {
    if !quiet() {
        println!("  {} {}", name.green(), status.dimmed());
    }
}

/// Print a warning message (yellow)
pub fn warning(message: &str) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.yellow());
}

/// Print an error message (red)
pub fn error(message: &str) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
}

/// Create a spinner for a download whose size is not yet known.
///
/// Hidden in quiet mode.
pub fn download_spinner(message: &str) -> ProgressBar {
    if quiet() {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("     {spinner:.cyan} {msg}") {
        pb.set_style(style.tick_chars(SPINNER_CHARS));
    }
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(TICK_INTERVAL_MS));
    pb
}

/// Upgrade a spinner to a byte progress bar once the content length is known.
pub fn upgrade_to_bytes(pb: &ProgressBar, total_bytes: u64) {
    pb.set_length(total_bytes);
    if let Ok(style) = ProgressStyle::default_bar().template(BYTES_TEMPLATE) {
        pb.set_style(style.progress_chars("━╸━"));
    }
}

/// RAII guard that clears a progress bar when dropped.
///
/// ```ignore
/// let pb = download_spinner("downloading...");
/// let _guard = ProgressGuard::new(&pb);
/// stream_body()?; // pb cleared even if this fails
/// ```
pub struct ProgressGuard<'a>(&'a ProgressBar);

impl<'a> ProgressGuard<'a> {
    pub fn new(pb: &'a ProgressBar) -> Self {
        Self(pb)
    }
}

impl Drop for ProgressGuard<'_> {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}
