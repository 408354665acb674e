//! Structured logging for Heraldo.
//!
//! Installs a `tracing-subscriber` registry with an [`EnvFilter`] and either
//! JSON output (production) or pretty, human-readable output (development).
//! When `RUST_LOG` is set it takes precedence over the configured level.
//!
//! # Example
//!
//! ```rust,ignore
//! use heraldo_telemetry::logging::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//!
//! tracing::info!(request_id = "abc-123", "Request completed");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::Subscriber;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Output format of log events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event.
    #[default]
    Json,
    /// Multi-line, human-readable output.
    Pretty,
}

impl LogFormat {
    /// Returns the format name as used in configuration.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Pretty => "pretty",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = TelemetryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "text" => Ok(Self::Pretty),
            other => Err(TelemetryError::InvalidConfig(format!(
                "unknown log format '{other}' (expected json or pretty)"
            ))),
        }
    }
}

/// How [`init_logging`] sets up the global subscriber.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    /// When false, [`init_logging`] installs nothing.
    pub enabled: bool,
    /// `EnvFilter` directive, used only when `RUST_LOG` is unset.
    pub level: String,
    /// JSON or pretty.
    pub format: LogFormat,
    /// Colour escapes; ignored by the JSON format.
    pub ansi: bool,
    /// Source file and line of each event.
    pub include_location: bool,
    /// Module path of each event.
    pub include_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            format: LogFormat::Json,
            ansi: false,
            include_location: false,
            include_target: true,
        }
    }
}

impl LogConfig {
    /// Pretty, coloured output at `debug`, with event locations.
    #[must_use]
    pub fn development() -> Self {
        Self {
            level: "debug".to_string(),
            format: LogFormat::Pretty,
            ansi: true,
            include_location: true,
            ..Self::default()
        }
    }

    /// JSON at `info`. Same as [`LogConfig::default`].
    #[must_use]
    pub fn production() -> Self {
        Self::default()
    }
}

/// Installs the global `tracing` subscriber described by `config`.
///
/// `RUST_LOG` overrides `config.level` when it is set and parses.
///
/// # Errors
///
/// [`TelemetryError::InvalidConfig`] when the level is not a valid directive,
/// [`TelemetryError::LoggingInit`] when a global subscriber already exists.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => create_env_filter(&config.level)?,
    };

    tracing_subscriber::registry()
        .with(fmt_layer(config).with_filter(filter))
        .try_init()
        .map_err(|e| TelemetryError::LoggingInit(e.to_string()))
}

/// Parses a level directive such as `info` or `heraldo_middleware=trace,warn`.
///
/// # Errors
///
/// [`TelemetryError::InvalidConfig`] when the directive does not parse.
pub fn create_env_filter(directive: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(directive).map_err(|e| {
        TelemetryError::InvalidConfig(format!("invalid log level '{directive}': {e}"))
    })
}

fn fmt_layer<S>(config: &LogConfig) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    let layer = tracing_subscriber::fmt::layer()
        .with_file(config.include_location)
        .with_line_number(config.include_location)
        .with_target(config.include_target);

    match config.format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Pretty => layer.pretty().with_ansi(config.ansi).boxed(),
    }
}
