//! `tracing` subscriber setup.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to install tracing subscriber: {0}")]
    Install(String),
}

/// `RUST_LOG` wins; otherwise the configured filter.
fn filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter))
}

/// Install the global fmt subscriber.
///
/// # Panics
///
/// If a global subscriber is already set. Use [`try_init`] where that can
/// happen, e.g. in tests.
pub fn init(config: &LoggingConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();
}

pub fn try_init(config: &LoggingConfig) -> Result<(), LoggingError> {
    tracing_subscriber::fmt()
        .with_env_filter(filter(config))
        .with_target(true)
        .with_level(true)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .try_init()
        .map_err(|e| LoggingError::Install(e.to_string()))
}
