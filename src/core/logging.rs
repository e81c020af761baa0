//! Tracing subscriber setup for the binary
//!
//! The library only emits `tracing` events; installing a subscriber is the
//! host's job. `RUST_LOG` overrides the default filter.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "info";

/// Install a formatted subscriber; `verbose` lowers the default to `debug`
///
/// Calling this twice is harmless: the second install is ignored.
pub fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
