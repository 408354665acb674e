//! Validation targets.

use serde::{Deserialize, Serialize};

/// The part of an incoming request a schema is applied to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationTarget {
    /// The decoded JSON request body.
    #[default]
    Body,
    /// The URL query parameters.
    Query,
    /// The path parameters captured by the router.
    Params,
}

impl ValidationTarget {
    /// Returns the target name used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Body => "body",
            Self::Query => "query",
            Self::Params => "params",
        }
    }
}

impl std::fmt::Display for ValidationTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
