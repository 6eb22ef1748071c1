//! Tracing bootstrap for hosts embedding the engine.

use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

/// Install a global `tracing` subscriber honoring `RUST_LOG`, defaulting to
/// `info`. Errors if a subscriber is already installed.
pub fn try_init() -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .finish()
        .try_init()
}

/// Like [`try_init`], but quietly keeps an already-installed subscriber.
pub fn init() {
    let _ = try_init();
}
