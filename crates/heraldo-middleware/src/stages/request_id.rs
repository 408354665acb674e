//! Request tagging.
//!
//! Every request gets exactly one identifier before anything else runs:
//!
//! 1. An identifier already on the [`RequestContext`] is kept as-is
//! 2. Otherwise, if incoming identifiers are trusted, a valid value of the
//!    configured header is used
//! 3. Otherwise a random UUID v4 is generated
//!
//! The identifier is echoed on every response, success or failure.

use heraldo_config::{ConfigError, PipelineConfig};
use heraldo_core::RequestId;
use http::header::{HeaderName, HeaderValue};
use http::HeaderMap;

use crate::context::RequestContext;
use crate::types::Response;

/// The default header name for request identifier propagation.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Assigns and echoes request identifiers.
///
/// # Example
///
/// ```
/// use heraldo_middleware::stages::request_id::RequestIdStage;
/// use heraldo_middleware::RequestContext;
/// use http::HeaderMap;
///
/// let stage = RequestIdStage::new();
/// let mut headers = HeaderMap::new();
/// headers.insert("x-request-id", "abc-123".parse().unwrap());
///
/// let mut ctx = RequestContext::new();
/// let id = stage.tag(&mut ctx, &headers);
/// assert_eq!(id.as_str(), "abc-123");
/// ```
#[derive(Debug, Clone)]
pub struct RequestIdStage {
    header: HeaderName,
    trust_incoming: bool,
}

impl Default for RequestIdStage {
    fn default() -> Self {
        Self {
            header: HeaderName::from_static(REQUEST_ID_HEADER),
            trust_incoming: true,
        }
    }
}

impl RequestIdStage {
    /// Creates a stage that reads and writes `x-request-id` and trusts
    /// incoming values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the stage from the pipeline configuration section.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let header = HeaderName::from_bytes(config.request_id_header.as_bytes()).map_err(|_| {
            ConfigError::invalid_value(
                "pipeline.request_id_header",
                format!("not a valid header name: {:?}", config.request_id_header),
            )
        })?;
        Ok(Self {
            header,
            trust_incoming: config.trust_incoming_request_id,
        })
    }

    /// Uses a different header name.
    #[must_use]
    pub fn header(mut self, header: HeaderName) -> Self {
        self.header = header;
        self
    }

    /// Sets whether identifiers supplied by the caller are kept.
    #[must_use]
    pub fn trust_incoming(mut self, trust: bool) -> Self {
        self.trust_incoming = trust;
        self
    }

    /// Returns the header name in use.
    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.header
    }

    /// Assigns an identifier to `ctx` (unless it has one) and returns the
    /// identifier in effect.
    pub fn tag(&self, ctx: &mut RequestContext, headers: &HeaderMap) -> RequestId {
        if let Some(existing) = ctx.request_id() {
            return existing.clone();
        }

        let request_id = self
            .extract(headers)
            .unwrap_or_else(RequestId::generate);
        ctx.set_request_id_if_absent(request_id).clone()
    }

    /// Writes the identifier to the response headers.
    pub fn stamp(&self, response: &mut Response, request_id: &RequestId) {
        match HeaderValue::from_str(request_id.as_str()) {
            Ok(value) => {
                response.headers_mut().insert(self.header.clone(), value);
            }
            Err(_) => {
                tracing::warn!(request_id = %request_id, "Request id is not a valid header value");
            }
        }
    }

    fn extract(&self, headers: &HeaderMap) -> Option<RequestId> {
        if !self.trust_incoming {
            return None;
        }

        headers
            .get(&self.header)
            .and_then(|value| value.to_str().ok())
            .and_then(RequestId::parse)
    }
}
