//! Tracing subscriber setup

use safety_replay_core::config::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// RUST_LOG wins over the configured level; `--verbose` raises the configured
/// level to debug. Logs go to stderr so stdout stays reserved for results.
pub fn init(config: &LoggingConfig, verbose: bool) {
    let level = if verbose { "debug" } else { config.level.as_str() };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let result = match config.format {
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    match result {
        Ok(()) => tracing::debug!("Logging initialized: level={}, format={}", level, config.format),
        Err(e) => eprintln!("Failed to initialize logging: {}", e),
    }
}
