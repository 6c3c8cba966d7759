//! Tracing subscriber initialization.

#[cfg(feature = "telemetry")]
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::TesseraResult;
use serde::{Deserialize, Serialize};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output.
    #[default]
    Pretty,
    /// One JSON object per line.
    Json,
}

/// Telemetry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Service name attached to the startup event.
    #[serde(default = "default_service_name")]
    pub service_name: String,

    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Output format.
    #[serde(default)]
    pub log_format: LogFormat,

    /// Whether to emit anything at all.
    #[serde(default = "default_console_output")]
    pub console_output: bool,
}

fn default_service_name() -> String {
    "tessera".to_string()
}

fn default_log_level() -> String {
    "info,tessera=debug".to_string()
}

fn default_console_output() -> bool {
    true
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: default_service_name(),
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            console_output: default_console_output(),
        }
    }
}

/// Installs the global tracing subscriber.
///
/// Calling it twice is harmless: the second call leaves the first
/// subscriber in place.
#[cfg(feature = "telemetry")]
pub fn init_tracing(config: &TelemetryConfig) -> TesseraResult<()> {
    if !config.console_output {
        return Ok(());
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| crate::TesseraError::Configuration(format!("Invalid log filter: {e}")))?;

    let installed = match config.log_format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_target(true))
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init(),
    };

    if installed.is_ok() {
        tracing::info!(
            service_name = %config.service_name,
            log_format = ?config.log_format,
            "Tracing initialized"
        );
    }

    Ok(())
}

/// Placeholder for when the telemetry feature is disabled.
#[cfg(not(feature = "telemetry"))]
pub fn init_tracing(_config: &TelemetryConfig) -> TesseraResult<()> {
    Ok(())
}
