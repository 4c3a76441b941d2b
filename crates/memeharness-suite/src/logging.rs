//! Tracing setup for test runs.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Initialize the tracing subscriber once per process.
///
/// Respects `RUST_LOG`; defaults to `info` with `debug` for the harness
/// crates so retry diagnostics show up in failing test output.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,memeharness_http=debug,memeharness_api=debug"));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .init();
    });
}
