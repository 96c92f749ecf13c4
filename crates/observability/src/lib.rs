//! Tracing/logging setup shared by the carpool binaries.

/// Initialize process-wide logging with the default filter (`warn`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init("warn");
}

/// Tracing configuration (filters, layers).
pub mod tracing;
