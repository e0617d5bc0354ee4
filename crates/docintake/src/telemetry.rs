//! Process-wide tracing setup.
//!
//! Installs a `tracing` subscriber filtered by `RUST_LOG` and bridges records
//! emitted through the `log` facade into it.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

use crate::config::ServiceSettings;

pub const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("A global tracing subscriber is already installed: {0}")]
    Subscriber(#[from] tracing::subscriber::SetGlobalDefaultError),

    #[error("Failed to bridge log records into tracing: {0}")]
    LogBridge(#[from] log::SetLoggerError),
}

/// Installs the global subscriber. Fails if one is already set.
pub fn init(format: LogFormat) -> Result<(), TelemetryError> {
    init_with_filter(format, DEFAULT_FILTER)
}

/// Installs the global subscriber in the format chosen by `settings`.
pub fn init_from_settings(settings: &ServiceSettings) -> Result<(), TelemetryError> {
    init(settings.log_format)
}

pub fn init_with_filter(format: LogFormat, default_filter: &str) -> Result<(), TelemetryError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let (plain, json) = match format {
        LogFormat::Plain => (Some(tracing_subscriber::fmt::layer().with_target(true)), None),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false),
            ),
        ),
    };

    let subscriber = tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(json);

    tracing::subscriber::set_global_default(subscriber)?;
    tracing_log::LogTracer::init()?;
    Ok(())
}
