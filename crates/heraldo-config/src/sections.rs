//! Configuration section types.

use heraldo_telemetry::{LogConfig, LogFormat};
use serde::{Deserialize, Serialize};

/// Pipeline configuration section.
///
/// # Example
///
/// ```
/// use heraldo_config::PipelineConfig;
///
/// let config = PipelineConfig::default();
/// assert_eq!(config.request_id_header, "x-request-id");
/// assert!(config.trust_incoming_request_id);
/// assert_eq!(config.max_body_bytes, 1024 * 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct PipelineConfig {
    /// Header carrying the request identifier, inbound and outbound.
    #[serde(default = "default_request_id_header")]
    pub request_id_header: String,

    /// Keep an identifier supplied by the caller or an upstream proxy.
    #[serde(default = "default_true")]
    pub trust_incoming_request_id: bool,

    /// Largest accepted request body, in bytes.
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            request_id_header: default_request_id_header(),
            trust_incoming_request_id: true,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

fn default_request_id_header() -> String {
    "x-request-id".to_string()
}

fn default_max_body_bytes() -> usize {
    1024 * 1024
}

/// Error response configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ErrorsConfig {
    /// Message sent when a failure carries none.
    #[serde(default = "default_internal_error_message")]
    pub internal_error_message: String,

    /// Always send `internal_error_message` for 5xx responses.
    #[serde(default)]
    pub redact_server_errors: bool,
}

impl Default for ErrorsConfig {
    fn default() -> Self {
        Self {
            internal_error_message: default_internal_error_message(),
            redact_server_errors: false,
        }
    }
}

fn default_internal_error_message() -> String {
    "Internal error".to_string()
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

impl LoggingConfig {
    /// Converts this section into the telemetry crate's [`LogConfig`].
    #[must_use]
    pub fn to_log_config(&self) -> LogConfig {
        LogConfig {
            enabled: self.enabled,
            level: self.level.clone(),
            format: self.format,
            ansi: self.ansi_enabled,
            include_location: self.include_location,
            include_target: true,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
