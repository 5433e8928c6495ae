//! Test logging setup

use tracing_subscriber::{fmt, EnvFilter};

/// Install a test-friendly subscriber once; later calls are no-ops.
///
/// Honours `RUST_LOG`, defaulting to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
