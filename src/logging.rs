//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events. Hosts that do not install their
//! own subscriber can call [`init`].

use tracing_subscriber::{fmt, EnvFilter};

/// Installs a formatted subscriber.
///
/// # Environment
/// - `RUST_LOG`: filter directive (default: `info`), e.g.
///   `RUST_LOG=u_linebalance=debug` to trace every assignment decision.
///
/// # Example
/// ```no_run
/// u_linebalance::logging::init();
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();
}

/// Installs a debug-level subscriber writing to the test harness.
///
/// Safe to call from every test; only the first call takes effect.
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}
