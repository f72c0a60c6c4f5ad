//! Structured logging using **tracing**.
//!
//! Generated-code tools run inside `go generate`, so stdout is left alone and
//! every diagnostic goes to stderr as JSON lines.

use tracing::{error, warn};
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset: warnings (formatting fallbacks)
/// and fatal errors only.
const DEFAULT_FILTER: &str = "warn";

/// Initializes the global tracing collector (subscriber).
///
/// Call once at the start of the process.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=yamlenums_core=debug`)
pub fn init_structured_logging() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    // try_init: a second call (tests, embedding tools) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Logs a warning event.
pub fn log_warn(message: &str) {
    warn!(detail = %message);
}

/// Logs an error event.
pub fn log_error(message: &str) {
    error!(detail = %message);
}
