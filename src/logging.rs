//! Logging configuration for the query runner.
//!
//! Logs go to stderr so the JSON written to stdout stays machine-readable.

use tracing_subscriber::EnvFilter;

/// Default filter directive when `RUST_LOG` is unset.
const DEFAULT_FILTER: &str = "info";

/// Initializes logging to stderr.
///
/// The filter is read from `RUST_LOG`, falling back to `info`. `quiet`
/// lowers the fallback to `warn`.
pub fn init_stderr_logging(quiet: bool) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(quiet))
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the filter used by [`init_stderr_logging`].
fn env_filter(quiet: bool) -> EnvFilter {
    let fallback = if quiet { "warn" } else { DEFAULT_FILTER };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}
