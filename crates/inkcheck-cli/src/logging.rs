//! Tracing subscriber setup

use crate::config::Verbosity;
use tracing_subscriber::EnvFilter;

/// Install the global subscriber; `RUST_LOG` overrides `verbosity`
///
/// Logs go to stderr so `--json` output on stdout stays parseable.
pub fn init_logging(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.filter_directive()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
