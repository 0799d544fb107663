//! Tracing/logging initialization.
//!
//! Every entry point uses `try_init`, so only the first call in a process
//! installs a subscriber.

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::SystemTime;

use crate::config::{DEFAULT_FILTER, LogFormat, ObservabilityConfig};

/// Initialize tracing/logging with an explicit configuration.
///
/// Returns `false` if a global subscriber was already installed. Invalid
/// filter directives fall back to `info`.
pub fn init_with(config: &ObservabilityConfig) -> bool {
    let filter = EnvFilter::try_new(&config.filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Json => builder.json().with_timer(SystemTime).try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    installed.is_ok()
}

/// Subscriber for test binaries: output is captured per test, `RUST_LOG`
/// still applies, and the default level is `debug`.
pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_initialization_is_a_no_op() {
        init_for_tests();
        init_for_tests();
        assert!(!init_with(&ObservabilityConfig::default().with_format(LogFormat::Pretty)));
        ::tracing::debug!("still logging");
    }
}
