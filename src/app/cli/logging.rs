//! Diagnostic logging to stderr, filtered by `RUST_LOG`.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber. `verbose` lowers the default level to debug;
/// an explicit `RUST_LOG` always wins.
pub fn init(verbose: bool) {
    let default_level = if verbose { "lxdask=debug" } else { "lxdask=warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // a subscriber may already be installed when embedded in another binary
    let _ = tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}
