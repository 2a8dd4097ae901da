//! Shared integration-test setup.
//!
//! Installing a `tracing` subscriber lives here rather than in the
//! library itself: `tracing-subscriber` is dev-tooling, not something
//! `mure` should force on every consumer.

use std::sync::Once;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

static INIT: Once = Once::new();

/// Install a process-wide `tracing` subscriber exactly once, so tests
/// that set `MURE_LOG_ERRORS` can see `http::send`'s `tracing::error!`
/// output under `cargo test -- --nocapture`.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::registry()
            .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mure=debug")))
            .with(tracing_subscriber::fmt::layer().with_test_writer())
            .init();
    });
}
