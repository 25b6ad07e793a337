//! Tracing and logging setup shared by the gridcat binaries.

/// Tracing configuration (filters, output format).
pub mod tracing;

pub use self::tracing::{LogFormat, TracingConfig};

/// Initialize process-wide observability with the defaults (JSON, `info`).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init(&TracingConfig::default());
}

/// Initialize with `LOG_FORMAT` (`json` or `pretty`) read from the environment.
pub fn init_from_env() {
    tracing::init(&TracingConfig::from_env());
}
