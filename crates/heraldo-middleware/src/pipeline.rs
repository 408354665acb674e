//! Linear request dispatcher.
//!
//! A [`Pipeline`] runs every request through the same ordered steps:
//!
//! ```text
//! Request ─► tag ─► decode ─► stage 0 ─► … ─► stage n ─► handler ─► Response
//!                      │          │              │          │
//!                      └──────────┴──────┬───────┴──────────┘
//!                                        ▼
//!                                 error normalizer ─► Response
//! ```
//!
//! The dispatcher owns the control flow. Stages never call the next stage;
//! they return `Ok(())` to continue or a [`PipelineFailure`] to stop. The
//! first failure skips every remaining stage and the handler, and goes to
//! the error normalizer. Each request follows the transitions of
//! [`PipelineState`] and produces exactly one response, which always carries
//! the request identifier header.

use std::sync::Arc;

use heraldo_config::{ConfigError, HeraldoConfig};
use heraldo_core::{PipelineFailure, PipelineResult, ValidationTarget};
use heraldo_schema::ParseSchema;

use crate::context::{PipelineState, RequestContext};
use crate::request::{ApiRequest, PathParams};
use crate::stage::Stage;
use crate::stages::{validate, ErrorNormalizer, RequestIdStage};
use crate::types::{BoxFuture, Request, Response};

/// A type-erased stage that can be stored in a vector.
pub type BoxedStage = Arc<dyn Stage>;

/// Default request body limit (1 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// The request pipeline.
///
/// # Example
///
/// ```
/// use heraldo_core::ValidationTarget;
/// use heraldo_middleware::{PathParams, Pipeline, Response, ResponseExt};
/// use heraldo_schema::Schema;
/// use http::StatusCode;
///
/// # tokio_test::block_on(async {
/// let user: Schema = Schema::object().field("name", Schema::string()).into();
/// let pipeline = Pipeline::builder()
///     .validate(user, ValidationTarget::Body)
///     .build();
///
/// let request = http::Request::builder()
///     .method("POST")
///     .uri("/users")
///     .body(http_body_util::Full::new(bytes::Bytes::from(r#"{"name":"Ada"}"#)))
///     .unwrap();
///
/// let response = pipeline
///     .process(request, PathParams::new(), |_ctx, req| {
///         Box::pin(async move { Ok(Response::json(StatusCode::CREATED, req.body())) })
///     })
///     .await;
///
/// assert_eq!(response.status(), StatusCode::CREATED);
/// assert!(response.headers().contains_key("x-request-id"));
/// # });
/// ```
pub struct Pipeline {
    request_id: RequestIdStage,
    stages: Vec<BoxedStage>,
    normalizer: ErrorNormalizer,
    max_body_bytes: usize,
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Processes a request with a fresh [`RequestContext`].
    pub async fn process<H>(&self, request: Request, params: PathParams, handler: H) -> Response
    where
        H: FnOnce(&mut RequestContext, ApiRequest) -> BoxFuture<'static, PipelineResult<Response>>
            + Send,
    {
        let mut ctx = RequestContext::new();
        self.process_with_context(&mut ctx, request, params, handler)
            .await
    }

    /// Processes a request with a caller-provided context.
    ///
    /// An identifier already present on `ctx` is kept. A context must be
    /// fresh ([`PipelineState::Received`]); one that already went through the
    /// pipeline gets a 500 without running any stage or the handler, and its
    /// state is left unchanged.
    pub async fn process_with_context<H>(
        &self,
        ctx: &mut RequestContext,
        request: Request,
        params: PathParams,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut RequestContext, ApiRequest) -> BoxFuture<'static, PipelineResult<Response>>
            + Send,
    {
        let request_id = self.request_id.tag(ctx, request.headers());

        if ctx.state() != PipelineState::Received {
            tracing::warn!(
                request_id = %request_id,
                state = %ctx.state(),
                "Request context reused, skipping stages and handler"
            );
            let failure = PipelineFailure::unclassified(anyhow::anyhow!(
                "request context reused in state {}",
                ctx.state()
            ));
            let mut response = self.normalizer.respond(ctx, &request_id, &failure);
            self.request_id.stamp(&mut response, &request_id);
            return response;
        }

        ctx.advance(PipelineState::Tagged);

        let method = request.method().clone();
        let path = request.uri().path().to_string();

        let mut response = match self.dispatch(ctx, request, params, handler).await {
            Ok(response) => response,
            Err(failure) => {
                ctx.advance(PipelineState::Failed);
                self.normalizer.respond(ctx, &request_id, &failure)
            }
        };

        self.request_id.stamp(&mut response, &request_id);
        ctx.advance(PipelineState::Responded);

        tracing::info!(
            request_id = %request_id,
            http.method = %method,
            http.path = %path,
            http.status_code = response.status().as_u16(),
            duration_ms = u64::try_from(ctx.elapsed().as_millis()).unwrap_or(u64::MAX),
            "Request completed"
        );

        response
    }

    async fn dispatch<H>(
        &self,
        ctx: &mut RequestContext,
        request: Request,
        params: PathParams,
        handler: H,
    ) -> PipelineResult<Response>
    where
        H: FnOnce(&mut RequestContext, ApiRequest) -> BoxFuture<'static, PipelineResult<Response>>
            + Send,
    {
        let mut api = ApiRequest::from_http(request, params, self.max_body_bytes).await?;

        for (index, stage) in self.stages.iter().enumerate() {
            ctx.advance(PipelineState::Validating(index));
            tracing::trace!(stage = stage.name(), index, "Running stage");
            stage.process(ctx, &mut api)?;
        }

        ctx.advance(PipelineState::Handling);
        handler(ctx, api).await
    }

    /// Returns the names of all steps in execution order.
    ///
    /// The first entry is always `request_id` and the last is always
    /// `error_normalization`.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(self.stages.len() + 2);
        names.push("request_id");
        names.extend(self.stages.iter().map(|stage| stage.name()));
        names.push("error_normalization");
        names
    }

    /// Returns the number of stages between tagging and the handler.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the request body limit in bytes.
    #[must_use]
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("max_body_bytes", &self.max_body_bytes)
            .finish_non_exhaustive()
    }
}

/// Builder for constructing a [`Pipeline`].
pub struct PipelineBuilder {
    request_id: RequestIdStage,
    stages: Vec<BoxedStage>,
    normalizer: ErrorNormalizer,
    max_body_bytes: usize,
}

impl PipelineBuilder {
    /// Creates a builder with default tagging, normalization and body limit,
    /// and no stages.
    #[must_use]
    pub fn new() -> Self {
        Self {
            request_id: RequestIdStage::new(),
            stages: Vec::new(),
            normalizer: ErrorNormalizer::new(),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Creates a builder from a loaded configuration.
    pub fn from_config(config: &HeraldoConfig) -> Result<Self, ConfigError> {
        if config.pipeline.max_body_bytes == 0 {
            return Err(ConfigError::invalid_value(
                "pipeline.max_body_bytes",
                "must be greater than 0",
            ));
        }

        Ok(Self {
            request_id: RequestIdStage::from_config(&config.pipeline)?,
            stages: Vec::new(),
            normalizer: ErrorNormalizer::from_config(&config.errors),
            max_body_bytes: config.pipeline.max_body_bytes,
        })
    }

    /// Replaces the request tagging step.
    #[must_use]
    pub fn request_id(mut self, stage: RequestIdStage) -> Self {
        self.request_id = stage;
        self
    }

    /// Appends a stage. Stages run in the order they are added.
    #[must_use]
    pub fn add_stage<S: Stage>(mut self, stage: S) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    /// Appends a schema validation stage for `target`.
    #[must_use]
    pub fn validate<S: ParseSchema>(self, schema: S, target: ValidationTarget) -> Self {
        self.add_stage(validate(schema, target))
    }

    /// Replaces the error normalizer.
    #[must_use]
    pub fn error_normalizer(mut self, normalizer: ErrorNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Sets the request body limit in bytes.
    #[must_use]
    pub fn max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }

    /// Builds the pipeline.
    #[must_use]
    pub fn build(self) -> Pipeline {
        Pipeline {
            request_id: self.request_id,
            stages: self.stages,
            normalizer: self.normalizer,
            max_body_bytes: self.max_body_bytes,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Shorthand for a handler failure with a status and message.
///
/// Equivalent to [`PipelineFailure::with_status`].
pub fn fail<T>(status: u16, message: impl Into<String>) -> PipelineResult<T> {
    Err(PipelineFailure::with_status(status, message))
}
