//! Server-side reporting of 5xx failures.
//!
//! The error normalizer hands every server-error failure to exactly one
//! [`DiagnosticsSink`]. The default sink, [`TracingDiagnostics`], writes an
//! `error`-level event with the request identifier and the full source chain
//! of the underlying error. Client-error failures never reach the sink.

use heraldo_core::{NormalizedError, PipelineFailure, RequestId};

/// Everything known about a server-error failure.
#[derive(Debug, Clone, Copy)]
pub struct Diagnostic<'a> {
    /// Identifier of the failed request.
    pub request_id: &'a RequestId,
    /// What the client received.
    pub error: &'a NormalizedError,
    /// The original failure, including any underlying error.
    pub failure: &'a PipelineFailure,
}

impl Diagnostic<'_> {
    /// Returns the messages of the failure's source chain, outermost first.
    #[must_use]
    pub fn source_chain(&self) -> Vec<String> {
        let mut chain = Vec::new();
        let mut source = std::error::Error::source(self.failure);
        while let Some(err) = source {
            chain.push(err.to_string());
            source = err.source();
        }
        chain
    }
}

/// Receives server-error diagnostics.
///
/// Any `Fn(&Diagnostic<'_>) + Send + Sync` closure is a sink.
pub trait DiagnosticsSink: Send + Sync + 'static {
    /// Records one failure.
    fn report(&self, diagnostic: &Diagnostic<'_>);
}

impl<F> DiagnosticsSink for F
where
    F: Fn(&Diagnostic<'_>) + Send + Sync + 'static,
{
    fn report(&self, diagnostic: &Diagnostic<'_>) {
        self(diagnostic);
    }
}

/// Sink that logs through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticsSink for TracingDiagnostics {
    fn report(&self, diagnostic: &Diagnostic<'_>) {
        tracing::error!(
            request_id = %diagnostic.request_id,
            http.status_code = diagnostic.error.status.as_u16(),
            client_message = %diagnostic.error.message,
            error = %diagnostic.failure,
            sources = ?diagnostic.source_chain(),
            "Request failed with server error"
        );
    }
}
