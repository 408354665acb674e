//! Errors raised while loading or validating configuration.

use std::path::PathBuf;
use thiserror::Error;

/// A configuration problem. Every variant names the file, field or variable
/// at fault.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The requested file does not exist.
    #[error("config file {} does not exist", .path.display())]
    Missing {
        /// Requested path.
        path: PathBuf,
    },

    /// The file exists but could not be read.
    #[error("could not read config file {}", .path.display())]
    Unreadable {
        /// Path of the file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file extension or format name is neither `toml` nor `json`.
    #[error("unsupported config format {format:?}, expected toml or json")]
    UnsupportedFormat {
        /// The extension or format name given.
        format: String,
    },

    /// Malformed TOML, or TOML with unknown keys.
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed JSON, or JSON with unknown keys.
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// A `.env` file could not be loaded.
    #[error("could not load env file {}", .path.display())]
    Dotenv {
        /// Path of the file.
        path: PathBuf,
        /// Loader failure.
        #[source]
        source: dotenvy::Error,
    },

    /// A loaded value breaks a validation rule.
    #[error("{field}: {reason}")]
    InvalidValue {
        /// Dotted field name, e.g. `pipeline.max_body_bytes`.
        field: String,
        /// What is wrong with it.
        reason: String,
    },

    /// An override variable could not be applied.
    #[error("{var}: {reason}")]
    InvalidEnv {
        /// Variable name.
        var: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn missing(path: impl Into<PathBuf>) -> Self {
        Self::Missing { path: path.into() }
    }

    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Unreadable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn unsupported_format(format: impl Into<String>) -> Self {
        Self::UnsupportedFormat {
            format: format.into(),
        }
    }

    pub(crate) fn dotenv(path: impl Into<PathBuf>, source: dotenvy::Error) -> Self {
        Self::Dotenv {
            path: path.into(),
            source,
        }
    }

    /// Creates an [`InvalidValue`](Self::InvalidValue) error.
    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_env(var: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEnv {
            var: var.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_messages_name_the_culprit() {
        let err = ConfigError::missing("/etc/heraldo/heraldo.toml");
        assert_eq!(
            err.to_string(),
            "config file /etc/heraldo/heraldo.toml does not exist"
        );

        let err = ConfigError::invalid_value("pipeline.max_body_bytes", "must be greater than 0");
        assert_eq!(err.to_string(), "pipeline.max_body_bytes: must be greater than 0");

        let err = ConfigError::invalid_env("HERALDO__PIPELINE__MAX_BODY_BYTES", "expected integer");
        assert_eq!(
            err.to_string(),
            "HERALDO__PIPELINE__MAX_BODY_BYTES: expected integer"
        );

        let err = ConfigError::unsupported_format("yaml");
        assert_eq!(
            err.to_string(),
            "unsupported config format \"yaml\", expected toml or json"
        );
    }

    #[test]
    fn test_unreadable_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err = ConfigError::unreadable("heraldo.toml", io);
        assert_eq!(err.source().map(ToString::to_string).as_deref(), Some("denied"));
    }
}
