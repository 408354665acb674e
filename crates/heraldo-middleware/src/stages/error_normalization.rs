//! Error normalization.
//!
//! The error normalizer is the single place where a [`PipelineFailure`]
//! becomes an HTTP response. It is always the last step of the pipeline and
//! runs only when something failed.
//!
//! # Mapping
//!
//! | Failure | Status | Body |
//! |---|---|---|
//! | Validation | 400 | `{"error": [issues...]}` |
//! | Handler with status 400..=599 | that status | `{"error": message}` |
//! | Handler without a usable status | 500 | `{"error": message}` |
//!
//! A missing or empty message becomes the configured internal error message
//! (`"Internal error"` by default). With `redact_server_errors`, every 5xx
//! response carries that message regardless of what the failure declared.
//!
//! # Diagnostics
//!
//! Every 5xx failure is reported to the [`DiagnosticsSink`] exactly once.
//! Client errors are only logged at debug level.

use std::sync::Arc;

use heraldo_config::ErrorsConfig;
use heraldo_core::{NormalizedError, PipelineFailure, RequestId, DEFAULT_INTERNAL_MESSAGE};
use heraldo_telemetry::metrics::record_failure;

use crate::context::RequestContext;
use crate::diagnostics::{Diagnostic, DiagnosticsSink, TracingDiagnostics};
use crate::types::{Response, ResponseExt};

/// Converts failures into the error envelope.
#[derive(Clone)]
pub struct ErrorNormalizer {
    internal_error_message: String,
    redact_server_errors: bool,
    diagnostics: Arc<dyn DiagnosticsSink>,
}

impl Default for ErrorNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorNormalizer {
    /// Creates a normalizer with the default message, no redaction and
    /// [`TracingDiagnostics`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            internal_error_message: DEFAULT_INTERNAL_MESSAGE.to_string(),
            redact_server_errors: false,
            diagnostics: Arc::new(TracingDiagnostics),
        }
    }

    /// Builds a normalizer from the errors configuration section.
    #[must_use]
    pub fn from_config(config: &ErrorsConfig) -> Self {
        Self::new()
            .internal_error_message(&config.internal_error_message)
            .redact_server_errors(config.redact_server_errors)
    }

    /// Sets the message used when a failure declares none.
    #[must_use]
    pub fn internal_error_message(mut self, message: &str) -> Self {
        self.internal_error_message = message.to_string();
        self
    }

    /// Sets whether 5xx responses always carry the internal error message.
    #[must_use]
    pub fn redact_server_errors(mut self, redact: bool) -> Self {
        self.redact_server_errors = redact;
        self
    }

    /// Replaces the sink receiving 5xx diagnostics.
    #[must_use]
    pub fn diagnostics(mut self, sink: impl DiagnosticsSink) -> Self {
        self.diagnostics = Arc::new(sink);
        self
    }

    /// Normalizes a failure without side effects.
    #[must_use]
    pub fn normalize(&self, failure: &PipelineFailure) -> NormalizedError {
        let mut error = NormalizedError::from_failure(failure, &self.internal_error_message);
        if self.redact_server_errors && error.is_server_error() {
            error.message.clone_from(&self.internal_error_message);
        }
        error
    }

    /// Normalizes a failure, reports it, and builds the error response.
    ///
    /// The [`NormalizedError`] is also stored as a context extension.
    pub fn respond(
        &self,
        ctx: &mut RequestContext,
        request_id: &RequestId,
        failure: &PipelineFailure,
    ) -> Response {
        let error = self.normalize(failure);
        record_failure(error.status.as_u16());

        if error.is_server_error() {
            self.diagnostics.report(&Diagnostic {
                request_id,
                error: &error,
                failure,
            });
        } else {
            tracing::debug!(
                request_id = %request_id,
                http.status_code = error.status.as_u16(),
                validation = failure.is_validation(),
                "Request failed with client error"
            );
        }

        let response = Response::json_error(&error);
        ctx.set_extension(error);
        response
    }
}

impl std::fmt::Debug for ErrorNormalizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorNormalizer")
            .field("internal_error_message", &self.internal_error_message)
            .field("redact_server_errors", &self.redact_server_errors)
            .finish_non_exhaustive()
    }
}
