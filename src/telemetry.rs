//! Tracing subscriber bootstrap for binaries and tests.
//!
//! The library itself only emits `tracing` events; installing a subscriber is
//! the embedding application's choice. [`init`] wires up the stack used by
//! the demos and tests: an env-filtered fmt layer plus span-trace capture for
//! error reports.

use tracing_error::ErrorLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a global subscriber honoring `RUST_LOG`, defaulting to `info`.
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .with(ErrorLayer::default())
        .try_init();
}
