//! Tracing subscriber setup
//!
//! The library only emits `tracing` events; binaries and tests call
//! [`init_tracing`] once to decide where they go.

use fieldsync_domain::{FieldSyncError, LoggingConfig, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Install the global fmt subscriber.
///
/// `RUST_LOG` wins over `config.level`. Calling this twice returns a
/// `Config` error instead of panicking.
pub fn init_tracing(config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(&config.level)?;
    let registry = Registry::default().with(filter);

    let installed = if config.json {
        registry.with(fmt::layer().json().with_target(true)).try_init()
    } else {
        registry.with(fmt::layer().with_target(true)).try_init()
    };

    installed.map_err(|e| {
        FieldSyncError::Config(format!("failed to install tracing subscriber: {e}"))
    })?;

    tracing::debug!(level = %config.level, json = config.json, "tracing initialized");
    Ok(())
}

fn build_filter(level: &str) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| FieldSyncError::Config(format!("invalid log level '{level}': {e}"))),
    }
}
