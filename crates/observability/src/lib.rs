//! Tracing and logging setup shared by binaries and test suites that embed
//! the value engine.

pub mod config;

/// Subscriber initialization (filters, formatters).
pub mod tracing;

pub use config::{LogFormat, ObservabilityConfig};
pub use self::tracing::{init_for_tests, init_with};

/// Initialize process-wide observability from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    init_with(&ObservabilityConfig::from_env());
}
