//! Shared tracing/logging setup for hubcycle binaries and test harnesses.
//!
//! The library crates only *emit* through `tracing`; whether and how those
//! events surface is the embedding process's choice, made once here.

/// Tracing configuration (filters, output format).
pub mod tracing;

/// Initialize process-wide observability.
///
/// Safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}
