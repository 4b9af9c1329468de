//! Diagnostic logging setup.
//!
//! Everything in the crate logs through `tracing`. The binary installs a
//! formatted subscriber whose filter comes from `RUST_LOG` when set and from
//! the configured default otherwise.

use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` wins, then `fallback`, then `info`.
pub fn env_filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber. Safe to call more than once; later calls
/// are ignored.
pub fn init(fallback: &str) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(fallback))
        .with_target(false)
        .try_init();
}
