//! Tracing setup helpers.
//!
//! The library itself only emits `tracing` events (batch flushes, drained
//! pipelines); wiring a subscriber is left to the embedding binary. This
//! module provides the conventional one-liner for binaries and tests.

use tracing_subscriber::{fmt, EnvFilter};

/// Initializes a formatting subscriber filtered by `RUST_LOG`, defaulting
/// to `info`.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}
