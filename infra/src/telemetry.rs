//! Tracing subscriber initialisation
//!
//! `RUST_LOG` takes precedence over the configured level when set.

use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sr_shared::{LogFormat, LoggingConfig};

use crate::InfrastructureError;

/// Install the global tracing subscriber described by `config`
///
/// Fails when the level directive is invalid or a subscriber is already set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level)
            .map_err(|e| InfrastructureError::Telemetry(format!("invalid log level: {}", e)))?,
    };

    let subscriber = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer()
        .with_ansi(config.colored)
        .with_target(config.with_target)
        .with_file(config.source_location)
        .with_line_number(config.source_location);

    let installed = match config.format {
        LogFormat::Json => subscriber.with(layer.json().with_current_span(true)).try_init(),
        LogFormat::Pretty => subscriber.with(layer.pretty()).try_init(),
        LogFormat::Compact => subscriber.with(layer.compact()).try_init(),
    };
    installed.map_err(|e| InfrastructureError::Telemetry(e.to_string()))?;

    debug!(level = %config.level, format = ?config.format, "tracing initialized");
    Ok(())
}
