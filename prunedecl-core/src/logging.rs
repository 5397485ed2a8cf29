//! Structured logging using **tracing**.
//!
//! The engine emits `debug!` events per fixpoint pass and per skipped
//! candidate, `info!` for each applied selection and `warn!` for dangling
//! handles in a tree dump. Subscribers write to stderr so the rewritten
//! program can go to stdout untouched.

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber with JSON output on stderr.
///
/// Call once at program start.
///
/// # Environment Variables
/// - `RUST_LOG`: Controls log filtering (e.g., `RUST_LOG=prunedecl_core=debug`)
pub fn init_structured_logging() {
    tracing_subscriber::fmt()
        .json()
        .with_ansi(false)
        .with_level(true)
        .with_target(true)
        .with_current_span(true)
        .with_env_filter(filter_from_env())
        .with_writer(std::io::stderr)
        .init();
}

/// Initializes a compact human-readable subscriber on stderr.
pub fn init_plain_logging() {
    tracing_subscriber::fmt()
        .compact()
        .with_target(false)
        .with_env_filter(filter_from_env())
        .with_writer(std::io::stderr)
        .init();
}

/// `RUST_LOG` if set, otherwise warnings only.
fn filter_from_env() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Logs a custom event with a specific event name.
///
/// Maps to a log level based on the event name.
pub fn log_event(event: &str, detail: &str) {
    match event.to_uppercase().as_str() {
        "ERROR" => error!(event = %event, detail = %detail),
        "WARN" | "WARNING" => warn!(event = %event, detail = %detail),
        _ => info!(event = %event, detail = %detail),
    }
}
