//! Tracing subscriber setup.

use tracing_subscriber::EnvFilter;

/// Initializes the global tracing subscriber.
///
/// Reads the filter from `RUST_LOG`, defaulting to `info`. Safe to call
/// more than once; later calls are ignored.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .ok();
}
