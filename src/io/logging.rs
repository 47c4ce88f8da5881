//! Diagnostic log setup

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber writing to stderr
///
/// Verbose runs log at `debug`, others at `warn`. `RUST_LOG` takes
/// precedence when set. Returns `false` if a subscriber was already
/// installed, in which case the existing one stays active.
pub fn init_logging(verbose: bool) -> bool {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok()
}
