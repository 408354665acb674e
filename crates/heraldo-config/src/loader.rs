//! Layered loading of [`HeraldoConfig`].

use std::env;
use std::fs;
use std::path::Path;

use crate::{ConfigError, HeraldoConfig};

/// Builds a [`HeraldoConfig`] from defaults, a file, `.env` and the
/// environment, in that order. Each layer overrides the one before it.
///
/// Environment overrides use `PREFIX__SECTION__KEY` names.
///
/// A file replaces the whole configuration; sections and fields it omits take
/// their default values.
///
/// # Example
///
/// ```no_run
/// use heraldo_config::ConfigLoader;
///
/// # fn main() -> Result<(), heraldo_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_optional_file("heraldo.toml")?
///     .with_dotenv()
///     .with_env_prefix("HERALDO")
///     .load()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    config: HeraldoConfig,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Starts from [`HeraldoConfig::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: HeraldoConfig::default(),
            env_prefix: None,
        }
    }

    /// Replaces the current values with [`HeraldoConfig::development`].
    ///
    /// # Example
    ///
    /// ```
    /// use heraldo_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new().with_development().load().unwrap();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn with_development(mut self) -> Self {
        self.config = HeraldoConfig::development();
        self
    }

    /// Replaces the current values with [`HeraldoConfig::production`].
    #[must_use]
    pub fn with_production(mut self) -> Self {
        self.config = HeraldoConfig::production();
        self
    }

    /// Replaces the current values with the contents of `path`, parsed as
    /// TOML or JSON according to its extension.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Missing`], [`ConfigError::Unreadable`],
    /// [`ConfigError::UnsupportedFormat`] or a parse error.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::missing(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::unreadable(path, e))?;

        self.config = Self::parse_file(&content, path)?;
        Ok(self)
    }

    /// Like [`with_file`](Self::with_file), but a missing file leaves the
    /// loader unchanged.
    ///
    /// # Errors
    ///
    /// Any error of [`with_file`](Self::with_file) other than `Missing`.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Replaces the current values with `content`, parsed as `format`
    /// (`toml` or `json`, case-insensitive).
    ///
    /// # Errors
    ///
    /// [`ConfigError::UnsupportedFormat`] or a parse error.
    ///
    /// # Example
    ///
    /// ```
    /// use heraldo_config::ConfigLoader;
    ///
    /// let toml = r#"
    ///     [errors]
    ///     internal_error_message = "Something went wrong"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.errors.internal_error_message, "Something went wrong");
    /// assert_eq!(config.pipeline.request_id_header, "x-request-id");
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        self.config = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            _ => return Err(ConfigError::unsupported_format(format)),
        };
        Ok(self)
    }

    /// Load a `.env` file from the current directory (or its parents) into
    /// the process environment. A missing file is not an error.
    #[must_use]
    pub fn with_dotenv(self) -> Self {
        let _ = dotenvy::dotenv();
        self
    }

    /// Load a specific `.env` file into the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Dotenv`] if the file is missing or malformed.
    pub fn with_dotenv_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        dotenvy::from_path(path).map_err(|e| ConfigError::dotenv(path, e))?;
        Ok(self)
    }

    /// Reads `PREFIX__SECTION__KEY` overrides from the process environment
    /// when [`load`](Self::load) runs.
    ///
    /// Variables use the format `PREFIX__SECTION__KEY`, for example
    /// `HERALDO__PIPELINE__MAX_BODY_BYTES=65536`.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Apply overrides from an explicit list of variables instead of the
    /// process environment. Variables without the prefix are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] for unparsable values.
    ///
    /// # Example
    ///
    /// ```
    /// use heraldo_config::ConfigLoader;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_env_vars("HERALDO", [("HERALDO__ERRORS__REDACT_SERVER_ERRORS", "yes")])
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert!(config.errors.redact_server_errors);
    /// ```
    pub fn with_env_vars<I, K, V>(mut self, prefix: &str, vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let prefix = prefix.to_uppercase();
        let scoped = format!("{prefix}__");
        for (key, value) in vars {
            let key = key.as_ref();
            if key.starts_with(&scoped) {
                self.apply_env_var(key, value.as_ref(), &prefix)?;
            }
        }
        Ok(self)
    }

    /// Applies process environment overrides, then validates.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidEnv`] for a bad override,
    /// [`ConfigError::InvalidValue`] when validation fails.
    pub fn load(mut self) -> Result<HeraldoConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self = self.with_env_vars(&prefix, env::vars())?;
        }

        self.config.validate()?;

        Ok(self.config)
    }

    /// The values as loaded so far. Skips environment overrides and validation.
    #[must_use]
    pub fn load_unvalidated(self) -> HeraldoConfig {
        self.config
    }

    fn parse_file(content: &str, path: &Path) -> Result<HeraldoConfig, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase);

        match extension.as_deref() {
            Some("toml") => Ok(toml::from_str(content)?),
            Some("json") => Ok(serde_json::from_str(content)?),
            other => Err(ConfigError::unsupported_format(other.unwrap_or_default())),
        }
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let key_without_prefix = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::invalid_env(key, "invalid key format"))?;

        let parts: Vec<&str> = key_without_prefix.split("__").collect();

        match parts.as_slice() {
            ["PIPELINE", "REQUEST_ID_HEADER"] => {
                self.config.pipeline.request_id_header = value.trim().to_ascii_lowercase();
            }
            ["PIPELINE", "TRUST_INCOMING_REQUEST_ID"] => {
                self.config.pipeline.trust_incoming_request_id = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_env(key, "expected boolean"))?;
            }
            ["PIPELINE", "MAX_BODY_BYTES"] => {
                self.config.pipeline.max_body_bytes = value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::invalid_env(key, "expected integer"))?;
            }

            ["ERRORS", "INTERNAL_ERROR_MESSAGE"] => {
                self.config.errors.internal_error_message = value.to_string();
            }
            ["ERRORS", "REDACT_SERVER_ERRORS"] => {
                self.config.errors.redact_server_errors = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_env(key, "expected boolean"))?;
            }

            ["LOGGING", "ENABLED"] => {
                self.config.logging.enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_env(key, "expected boolean"))?;
            }
            ["LOGGING", "LEVEL"] => {
                self.config.logging.level = value.trim().to_string();
            }
            ["LOGGING", "FORMAT"] => {
                self.config.logging.format = value
                    .parse()
                    .map_err(|_| ConfigError::invalid_env(key, "expected 'json' or 'pretty'"))?;
            }
            ["LOGGING", "ANSI_ENABLED"] => {
                self.config.logging.ansi_enabled = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_env(key, "expected boolean"))?;
            }
            ["LOGGING", "INCLUDE_LOCATION"] => {
                self.config.logging.include_location = parse_bool(value)
                    .ok_or_else(|| ConfigError::invalid_env(key, "expected boolean"))?;
            }

            // unknown keys are ignored
            _ => {}
        }

        Ok(())
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use heraldo_telemetry::LogFormat;
    use std::io::Write;

    #[test]
    fn test_loader_new() {
        let config = ConfigLoader::new().load().unwrap();
        assert_eq!(config, HeraldoConfig::default());
    }

    #[test]
    fn test_loader_with_production() {
        let config = ConfigLoader::new().with_production().load().unwrap();
        assert_eq!(config.logging.format, LogFormat::Json);
        assert!(config.errors.redact_server_errors);
    }

    #[test]
    fn test_loader_with_string_json() {
        let json = r#"{ "pipeline": { "max_body_bytes": 2048, "trust_incoming_request_id": false } }"#;
        let config = ConfigLoader::new()
            .with_string(json, "json")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config.pipeline.max_body_bytes, 2048);
        assert!(!config.pipeline.trust_incoming_request_id);
        assert_eq!(config.pipeline.request_id_header, "x-request-id");
    }

    #[test]
    fn test_loader_with_string_unknown_field() {
        let toml = "[pipeline]\nmax_body = 10\n";
        assert!(matches!(
            ConfigLoader::new().with_string(toml, "toml"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn test_loader_with_string_unsupported_format() {
        assert!(matches!(
            ConfigLoader::new().with_string("a: 1", "yaml"),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_loader_with_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            "[pipeline]\nrequest_id_header = \"x-correlation-id\"\n\n[logging]\nformat = \"pretty\""
        )
        .unwrap();

        let config = ConfigLoader::new().with_file(file.path()).unwrap().load().unwrap();
        assert_eq!(config.pipeline.request_id_header, "x-correlation-id");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_loader_with_file_unsupported_extension() {
        let file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        assert!(matches!(
            ConfigLoader::new().with_file(file.path()),
            Err(ConfigError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_loader_with_file_not_found() {
        assert!(matches!(
            ConfigLoader::new().with_file("/nonexistent/heraldo.toml"),
            Err(ConfigError::Missing { .. })
        ));
    }

    #[test]
    fn test_loader_with_optional_file_not_found() {
        let config = ConfigLoader::new()
            .with_optional_file("/nonexistent/heraldo.toml")
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(config, HeraldoConfig::default());
    }

    #[test]
    fn test_loader_with_dotenv_file_missing() {
        assert!(matches!(
            ConfigLoader::new().with_dotenv_file("/nonexistent/.env"),
            Err(ConfigError::Dotenv { .. })
        ));
    }

    #[test]
    fn test_validation_runs_on_load() {
        let toml = "[pipeline]\nmax_body_bytes = 0\n";
        let result = ConfigLoader::new().with_string(toml, "toml").unwrap().load();
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_parse_bool() {
        for truthy in ["true", "True", "1", "yes", "Y", "on", " on "] {
            assert_eq!(parse_bool(truthy), Some(true), "{truthy}");
        }
        for falsy in ["false", "FALSE", "0", "no", "n", "off"] {
            assert_eq!(parse_bool(falsy), Some(false), "{falsy}");
        }
        assert_eq!(parse_bool("maybe"), None);
        assert_eq!(parse_bool(""), None);
    }

    #[test]
    fn test_env_vars_override_file() {
        let config = ConfigLoader::new()
            .with_string("[errors]\nredact_server_errors = false\n", "toml")
            .unwrap()
            .with_env_vars(
                "heraldo",
                [
                    ("HERALDO__ERRORS__REDACT_SERVER_ERRORS", "on"),
                    ("HERALDO__PIPELINE__REQUEST_ID_HEADER", " X-Trace-Id "),
                    ("HERALDO__LOGGING__FORMAT", "pretty"),
                    ("HERALDO__UNKNOWN__KEY", "ignored"),
                    ("OTHER__ERRORS__REDACT_SERVER_ERRORS", "nope"),
                ],
            )
            .unwrap()
            .load()
            .unwrap();

        assert!(config.errors.redact_server_errors);
        assert_eq!(config.pipeline.request_id_header, "x-trace-id");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_apply_env_var_invalid_values() {
        let mut loader = ConfigLoader::new();
        assert!(matches!(
            loader.apply_env_var("HERALDO__PIPELINE__MAX_BODY_BYTES", "lots", "HERALDO"),
            Err(ConfigError::InvalidEnv { .. })
        ));
        assert!(loader
            .apply_env_var("HERALDO__LOGGING__ENABLED", "maybe", "HERALDO")
            .is_err());
        assert!(loader
            .apply_env_var("HERALDO__LOGGING__FORMAT", "xml", "HERALDO")
            .is_err());
        assert!(loader.apply_env_var("HERALDOX", "1", "HERALDO").is_err());
    }
}
