//! Field-level validation issues.

use serde::{Deserialize, Serialize};

/// Machine-readable classification of an [`Issue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueCode {
    /// A required value was absent.
    Required,
    /// The value had the wrong JSON type.
    InvalidType,
    /// A string, number or array was below its lower bound.
    TooSmall,
    /// A string, number or array was above its upper bound.
    TooBig,
    /// A string failed a format check (pattern, email, url).
    InvalidString,
    /// A string was not one of the allowed enum members.
    InvalidEnumValue,
    /// A value did not equal the expected literal.
    InvalidLiteral,
    /// An object carried keys its schema rejects.
    UnrecognizedKeys,
    /// A value matched none of a union's options.
    InvalidUnion,
    /// Raised by a user-supplied refinement.
    Custom,
}

/// A single field-level validation problem.
///
/// `path` is the dot-joined path of the offending value (array indices
/// appear as numbers, e.g. `ranges.0.from`); the empty string denotes the
/// root of the validated container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Path of the offending value.
    pub path: String,
    /// Issue classification.
    pub code: IssueCode,
    /// Human-readable reason.
    pub message: String,
}

impl Issue {
    /// Creates a new issue.
    #[must_use]
    pub fn new(path: impl Into<String>, code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            code,
            message: message.into(),
        }
    }

    /// Creates a "Required" issue for a missing value.
    #[must_use]
    pub fn required(path: impl Into<String>) -> Self {
        Self::new(path, IssueCode::Required, "Required")
    }

    /// Creates an issue raised by a custom refinement.
    #[must_use]
    pub fn custom(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(path, IssueCode::Custom, message)
    }
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.path.is_empty() {
            f.write_str(&self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}
