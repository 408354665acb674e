//! Failure taxonomy and the normalized error contract.
//!
//! Every failure raised inside the pipeline is a [`PipelineFailure`], and the
//! kind of failure is decided where it is raised:
//!
//! | Variant | Raised by | Client status |
//! |---|---|---|
//! | `Validation` | schema validation stage | always 400 |
//! | `Handler` | route handler / request decoding | declared status, else 500 |
//!
//! Anything else (an opaque `anyhow::Error`, for instance) converts into a
//! `Handler` failure with no declared status, which resolves to 500.
//!
//! The error normalizer turns a failure into a [`NormalizedError`], whose
//! [`ErrorEnvelope`] is the only JSON body a client ever sees on failure:
//!
//! ```json
//! { "error": "Not found" }
//! { "error": [ { "path": "name", "code": "required", "message": "Required" } ] }
//! ```

use crate::issue::Issue;
use crate::target::ValidationTarget;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Message used when a failure carries no usable message.
pub const DEFAULT_INTERNAL_MESSAGE: &str = "Internal error";

/// Result type alias using [`PipelineFailure`].
pub type PipelineResult<T> = Result<T, PipelineFailure>;

/// A failure signalled by a pipeline stage or a route handler.
///
/// # Example
///
/// ```
/// use heraldo_core::PipelineFailure;
/// use http::StatusCode;
///
/// let failure = PipelineFailure::with_status(404, "Not found");
/// assert_eq!(failure.resolved_status(), StatusCode::NOT_FOUND);
///
/// let failure = PipelineFailure::unclassified(std::io::Error::other("disk on fire"));
/// assert_eq!(failure.resolved_status(), StatusCode::INTERNAL_SERVER_ERROR);
/// ```
#[derive(Error, Debug)]
pub enum PipelineFailure {
    /// Input did not conform to a declared schema.
    #[error("validation of {target} failed with {} issue(s)", .issues.len())]
    Validation {
        /// The request part that was validated.
        target: ValidationTarget,
        /// Field-level issues, in the order the schema produced them.
        issues: Vec<Issue>,
    },

    /// Business logic (or request decoding) failed.
    #[error("handler failure: {}", .message.as_deref().unwrap_or("<no message>"))]
    Handler {
        /// Declared HTTP status, if any.
        status: Option<u16>,
        /// Declared client-facing message, if any.
        message: Option<String>,
        /// The underlying error (never exposed to clients).
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl PipelineFailure {
    /// Creates a validation failure.
    #[must_use]
    pub fn validation(target: ValidationTarget, issues: Vec<Issue>) -> Self {
        Self::Validation { target, issues }
    }

    /// Creates a handler failure with an explicit status and message.
    #[must_use]
    pub fn with_status(status: u16, message: impl Into<String>) -> Self {
        Self::Handler {
            status: Some(status),
            message: Some(message.into()),
            source: None,
        }
    }

    /// Creates a 400 handler failure.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::with_status(400, message)
    }

    /// Creates a 404 handler failure.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::with_status(404, message)
    }

    /// Creates a handler failure with a message but no declared status.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Handler {
            status: None,
            message: Some(message.into()),
            source: None,
        }
    }

    /// Wraps an arbitrary error as an unclassified failure (resolves to 500).
    pub fn unclassified(source: impl Into<anyhow::Error>) -> Self {
        Self::Handler {
            status: None,
            message: None,
            source: Some(source.into()),
        }
    }

    /// Attaches an underlying error to a handler failure.
    ///
    /// Validation failures are returned unchanged.
    #[must_use]
    pub fn with_source(self, source: impl Into<anyhow::Error>) -> Self {
        match self {
            Self::Handler {
                status, message, ..
            } => Self::Handler {
                status,
                message,
                source: Some(source.into()),
            },
            validation @ Self::Validation { .. } => validation,
        }
    }

    /// Returns `true` for schema validation failures.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Returns the issues of a validation failure.
    #[must_use]
    pub fn issues(&self) -> Option<&[Issue]> {
        match self {
            Self::Validation { issues, .. } => Some(issues),
            Self::Handler { .. } => None,
        }
    }

    /// Resolves the HTTP status a client should receive.
    ///
    /// Validation failures are always 400. A declared handler status is
    /// honoured only when it is an error status (400..=599); anything else
    /// resolves to 500.
    #[must_use]
    pub fn resolved_status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Handler { status, .. } => status
                .filter(|code| (400..=599).contains(code))
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    /// Resolves the client-facing message, falling back to `fallback` when the
    /// failure declares none (or an empty one).
    #[must_use]
    pub fn resolved_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation { .. } => "Validation failed".to_string(),
            Self::Handler { message, .. } => message
                .as_deref()
                .filter(|m| !m.is_empty())
                .unwrap_or(fallback)
                .to_string(),
        }
    }
}

impl From<anyhow::Error> for PipelineFailure {
    fn from(source: anyhow::Error) -> Self {
        Self::unclassified(source)
    }
}

/// The normalized form of a failure: status, message and optional issues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedError {
    /// HTTP status sent to the client.
    pub status: StatusCode,
    /// Client-facing message.
    pub message: String,
    /// Field-level issues (validation failures only).
    pub issues: Option<Vec<Issue>>,
}

impl NormalizedError {
    /// Normalizes a failure using `fallback` as the default message.
    #[must_use]
    pub fn from_failure(failure: &PipelineFailure, fallback: &str) -> Self {
        Self {
            status: failure.resolved_status(),
            message: failure.resolved_message(fallback),
            issues: failure.issues().map(<[Issue]>::to_vec),
        }
    }

    /// Returns `true` when the status is in the 5xx range.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        self.status.is_server_error()
    }

    /// Converts this error into its client-facing envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let error = match &self.issues {
            Some(issues) => ErrorDetail::Issues(issues.clone()),
            None => ErrorDetail::Message(self.message.clone()),
        };
        ErrorEnvelope { error }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error payload.
    pub error: ErrorDetail,
}

/// Payload of the `error` field: a message or an ordered issue list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorDetail {
    /// A single message (non-validation failures).
    Message(String),
    /// Ordered issues (validation failures).
    Issues(Vec<Issue>),
}
