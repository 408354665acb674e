//! # Heraldo Middleware
//!
//! The request pipeline for Heraldo services.
//!
//! Every request goes through the same linear sequence, driven by a single
//! dispatcher rather than a chain of callbacks:
//!
//! ```text
//! Request → RequestId → decode → Validation* → Handler → Response
//!                          ↓          ↓            ↓
//!                          └──── ErrorNormalization ───→ Response
//! ```
//!
//! | Step | Type | Purpose |
//! |------|------|---------|
//! | 1 | [`RequestIdStage`] | Assign or propagate the request identifier |
//! | 2 | [`ApiRequest`] | Decode the JSON body, query string and path parameters |
//! | 3 | [`ValidationStage`] | Parse one container against a schema (zero or more) |
//! | 4 | handler | Business logic, returns a response or a [`PipelineFailure`] |
//! | 5 | [`ErrorNormalizer`] | Convert any failure into the `{"error": ...}` envelope |
//!
//! Custom checks can be inserted among the validation stages by implementing
//! [`Stage`] or wrapping a closure in [`FnStage`].
//!
//! ## Example
//!
//! ```
//! use heraldo_core::ValidationTarget;
//! use heraldo_middleware::{fail, PathParams, Pipeline, Response, ResponseExt};
//! use heraldo_schema::{Schema, SchemaExt};
//! use http::StatusCode;
//!
//! # tokio_test::block_on(async {
//! let query: Schema = Schema::object()
//!     .field("limit", Schema::integer().coerce().max(100.0).default(20))
//!     .into();
//!
//! let pipeline = Pipeline::builder()
//!     .validate(query, ValidationTarget::Query)
//!     .build();
//!
//! let request = http::Request::builder()
//!     .uri("/orders?limit=500")
//!     .body(http_body_util::Full::new(bytes::Bytes::new()))
//!     .unwrap();
//!
//! let response = pipeline
//!     .process(request, PathParams::new(), |_ctx, _req| {
//!         Box::pin(async { fail(404, "Not found") })
//!     })
//!     .await;
//!
//! // The handler never ran: validation rejected the limit.
//! assert_eq!(response.status(), StatusCode::BAD_REQUEST);
//! # });
//! ```
//!
//! [`PipelineFailure`]: heraldo_core::PipelineFailure

#![doc(html_root_url = "https://docs.rs/heraldo-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod diagnostics;
pub mod pipeline;
pub mod request;
pub mod stage;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use context::{PipelineState, RequestContext};
pub use diagnostics::{Diagnostic, DiagnosticsSink, TracingDiagnostics};
pub use pipeline::{fail, BoxedStage, Pipeline, PipelineBuilder, DEFAULT_MAX_BODY_BYTES};
pub use request::{ApiRequest, PathParams};
pub use stage::{FnStage, Stage};
pub use stages::{ErrorNormalizer, RequestIdStage, ValidationStage, REQUEST_ID_HEADER};
pub use types::{BoxFuture, Request, Response, ResponseExt};
