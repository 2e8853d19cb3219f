//! Tracing/logging initialization.
//!
//! Cache invalidations, snapshot publications and fee aggregations all emit
//! structured events; this wires them to JSON output filtered via `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Initialize tracing/logging for the process.
///
/// Defaults to `info` when `RUST_LOG` is unset. Safe to call multiple times
/// (subsequent calls are no-ops).
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}
