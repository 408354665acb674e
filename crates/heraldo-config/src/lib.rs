//! Typed configuration for the Heraldo request pipeline.
//!
//! - TOML and JSON configuration files
//! - `.env` files via `dotenvy`
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//!
//! # Overview
//!
//! [`HeraldoConfig`] has three sections:
//!
//! - [`PipelineConfig`] - request identifier header and trust, body size limit
//! - [`ErrorsConfig`] - fallback error message and 5xx redaction
//! - [`LoggingConfig`] - log level, format and decoration
//!
//! # Example
//!
//! ```no_run
//! use heraldo_config::ConfigLoader;
//!
//! # fn main() -> Result<(), heraldo_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_production()
//!     .with_optional_file("heraldo.toml")?
//!     .with_env_prefix("HERALDO")
//!     .load()?;
//!
//! println!("request ids travel in {}", config.pipeline.request_id_header);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [pipeline]
//! request_id_header = "x-request-id"
//! trust_incoming_request_id = true
//! max_body_bytes = 1048576
//!
//! [errors]
//! internal_error_message = "Internal error"
//! redact_server_errors = false
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! Every value can be overridden with `PREFIX__SECTION__KEY`:
//!
//! - `HERALDO__PIPELINE__MAX_BODY_BYTES=65536`
//! - `HERALDO__ERRORS__REDACT_SERVER_ERRORS=yes`
//! - `HERALDO__LOGGING__FORMAT=pretty`
//!
//! Booleans accept `1/true/yes/y/on` and `0/false/no/n/off`.

#![doc(html_root_url = "https://docs.rs/heraldo-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod sections;

pub use config::HeraldoConfig;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use sections::{ErrorsConfig, LoggingConfig, PipelineConfig};
