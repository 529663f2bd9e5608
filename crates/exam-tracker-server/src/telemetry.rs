//! Logging setup.

use tracing_subscriber::EnvFilter;

/// Install the global stderr subscriber.
///
/// `RUST_LOG` wins over `default_filter`. `verbose` raises the default to
/// `debug`. Calling this twice is harmless.
pub fn init_logging(default_filter: &str, verbose: bool) {
    let default_filter = if verbose { "debug" } else { default_filter };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
