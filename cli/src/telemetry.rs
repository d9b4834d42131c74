//! Diagnostic logging setup.
//!
//! User-facing progress goes through `output`; `tracing` events are for
//! operators debugging a run and go to stderr.

use tracing_subscriber::EnvFilter;

/// Filter directives, e.g. `NOTEOMATIC_LOG=noteomatic_deploy=debug`.
pub const LOG_ENV: &str = "NOTEOMATIC_LOG";

/// Install the global subscriber. Safe to call more than once.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
