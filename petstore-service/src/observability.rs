//! Structured logging setup

use tracing_subscriber::EnvFilter;

use crate::{config::Config, error::Result};

/// Initialize JSON tracing output
///
/// `RUST_LOG` wins when set. Otherwise `service.log_level` accepts any
/// `EnvFilter` directive; an unparseable directive falls back to `info`.
/// Calling this twice is harmless, the second call leaves the existing
/// subscriber in place.
pub fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| build_filter(&config.service.log_level));

    if let Err(e) = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .try_init()
    {
        tracing::debug!("Tracing already initialized: {}", e);
        return Ok(());
    }

    tracing::info!("Tracing initialized for service: {}", config.service.name);

    Ok(())
}

fn build_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Flush-point for shutdown; logs that tracing is done
pub fn shutdown_tracing() {
    tracing::info!("Tracing shutdown complete");
}
