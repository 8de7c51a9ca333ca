//! Tracing initialization.

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initializes tracing with an env-filtered fmt subscriber.
///
/// `RUST_LOG` takes precedence; otherwise the given level is used.
pub fn init_tracing(default_level: &str) {
    let filter = std::env::var("RUST_LOG")
        .ok()
        .and_then(|_| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new(default_level));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}
