//! Schema construction errors.

use thiserror::Error;

/// Errors raised while building a schema (never while parsing input).
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A string pattern did not compile.
    #[error("invalid pattern `{pattern}`")]
    InvalidPattern {
        /// The offending pattern.
        pattern: String,
        /// Underlying regex error.
        #[source]
        source: regex::Error,
    },

    /// A numeric range had its lower bound above its upper bound.
    #[error("invalid range: min {min} is greater than max {max}")]
    InvalidRange {
        /// Lower bound.
        min: f64,
        /// Upper bound.
        max: f64,
    },
}
