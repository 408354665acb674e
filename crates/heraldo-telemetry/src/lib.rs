//! Observability for Heraldo services.
//!
//! - **Logging**: structured JSON or pretty output through `tracing-subscriber`
//! - **Metrics**: failure counters through the `metrics` facade
//!
//! # Example
//!
//! ```rust,ignore
//! use heraldo_telemetry::{init_logging, LogConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_logging(&LogConfig::development())?;
//!     heraldo_telemetry::metrics::describe_metrics();
//!     Ok(())
//! }
//! ```

#![doc(html_root_url = "https://docs.rs/heraldo-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
