//! Tracing subscriber setup for the server binary.

use taleweaver_error::{ConfigError, TaleweaverResult};
use taleweaver_rate_limit::ServerConfig;
use tracing_subscriber::{
    EnvFilter,
    layer::{Layer, SubscriberExt},
    util::SubscriberInitExt,
};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured `log_level`. JSON output is meant
/// for production log shipping; the default is human readable with source
/// locations.
///
/// # Errors
///
/// Fails on an unparsable filter or when a subscriber is already set.
pub fn init_tracing(config: &ServerConfig) -> TaleweaverResult<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| ConfigError::new(format!("Invalid log filter: {}", e)))?;

    let fmt_layer = if config.json_logs {
        tracing_subscriber::fmt::layer().json().boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))?;

    Ok(())
}
