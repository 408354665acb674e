//! Main configuration type.
//!
//! This module provides the top-level [`HeraldoConfig`] struct, its presets
//! and its validation rules.

use http::HeaderName;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ErrorsConfig, LoggingConfig, PipelineConfig};

/// Complete Heraldo configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use heraldo_config::HeraldoConfig;
///
/// let config = HeraldoConfig::default();
/// assert_eq!(config.errors.internal_error_message, "Internal error");
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HeraldoConfig {
    /// Request pipeline configuration.
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Error response configuration.
    #[serde(default)]
    pub errors: ErrorsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HeraldoConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let header = &self.pipeline.request_id_header;
        if HeaderName::from_bytes(header.as_bytes()).is_err() {
            return Err(ConfigError::invalid_value(
                "pipeline.request_id_header",
                format!("not a valid header name: {header:?}"),
            ));
        }

        if self.pipeline.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline.max_body_bytes",
                "must be greater than 0",
            ));
        }

        if self.errors.internal_error_message.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "errors.internal_error_message",
                "must not be empty",
            ));
        }

        if let Err(e) = heraldo_telemetry::logging::create_env_filter(&self.logging.level) {
            return Err(ConfigError::invalid_value("logging.level", e.to_string()));
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty, colored debug logs with source locations
    /// - Server error messages passed through to clients
    ///
    /// # Example
    ///
    /// ```
    /// use heraldo_config::HeraldoConfig;
    ///
    /// let config = HeraldoConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = heraldo_telemetry::LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config.errors.redact_server_errors = false;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON info logs
    /// - 5xx responses always carry the generic message
    ///
    /// # Example
    ///
    /// ```
    /// use heraldo_config::HeraldoConfig;
    ///
    /// let config = HeraldoConfig::production();
    /// assert!(config.errors.redact_server_errors);
    /// ```
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = heraldo_telemetry::LogFormat::Json;
        config.logging.ansi_enabled = false;

        config.errors.redact_server_errors = true;

        config
    }
}
