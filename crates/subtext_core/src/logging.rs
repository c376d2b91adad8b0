//! Logging setup for applications embedding the library.
//!
//! The library itself only emits `tracing` events (e.g. timestamp
//! overflow warnings from the format writers); installing a subscriber is
//! the embedding application's choice. This module offers a conventional
//! default.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize a global tracing subscriber.
///
/// Respects `RUST_LOG`, falling back to the provided filter directive.
/// Outputs to stderr with targets. Call once at application startup.
pub fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}

/// Initialize tracing for tests (warnings and above, test writer).
#[cfg(test)]
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_initializes_once() {
        init_test_tracing();
        // A second call must be a no-op, not a panic.
        init_test_tracing();
    }
}
