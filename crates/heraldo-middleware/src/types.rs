//! HTTP request and response types used by the pipeline.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;
use heraldo_core::NormalizedError;
use http::header::{HeaderValue, CONTENT_TYPE};
use http::StatusCode;
use http_body_util::Full;
use serde::Serialize;

/// The HTTP request type accepted by the pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body.
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type produced by the pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// A boxed future that is `Send`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

const SERIALIZATION_FALLBACK: &[u8] = br#"{"error":"Internal error"}"#;

/// Extension trait for building JSON responses.
pub trait ResponseExt {
    /// Creates a JSON response with the given status code.
    ///
    /// A body that fails to serialize yields a 500 with the generic envelope.
    fn json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response;

    /// Creates the error envelope response for a normalized failure.
    fn json_error(error: &NormalizedError) -> Response;
}

impl ResponseExt for Response {
    fn json<T: Serialize + ?Sized>(status: StatusCode, body: &T) -> Response {
        match serde_json::to_vec(body) {
            Ok(bytes) => json_response(status, Bytes::from(bytes)),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response body");
                json_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Bytes::from_static(SERIALIZATION_FALLBACK),
                )
            }
        }
    }

    fn json_error(error: &NormalizedError) -> Response {
        Self::json(error.status, &error.to_envelope())
    }
}

fn json_response(status: StatusCode, body: Bytes) -> Response {
    let mut response = http::Response::new(Full::new(body));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}
