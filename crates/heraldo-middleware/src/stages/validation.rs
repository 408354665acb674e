//! Schema validation stage.
//!
//! A [`ValidationStage`] parses one request container (body, query or path
//! parameters) against a schema. On success the container is replaced by the
//! parsed value, so defaults, coercions and stripped keys are what later
//! stages and the handler see. On failure the pipeline stops with a
//! validation failure carrying every issue the schema reported.
//!
//! Several validation stages may be stacked; each one sees the output of the
//! previous ones.
//!
//! # Example
//!
//! ```
//! use heraldo_core::ValidationTarget;
//! use heraldo_middleware::stages::validation::validate;
//! use heraldo_schema::{Schema, SchemaExt};
//!
//! let query = Schema::object()
//!     .field("page", Schema::integer().coerce().min(1.0).default(1))
//!     .into();
//!
//! let stage = validate::<Schema>(query, ValidationTarget::Query);
//! assert_eq!(stage.target(), ValidationTarget::Query);
//! ```

use std::sync::Arc;

use heraldo_core::{PipelineFailure, PipelineResult, ValidationTarget};
use heraldo_schema::ParseSchema;
use heraldo_telemetry::metrics::record_validation_issues;

use crate::context::RequestContext;
use crate::request::ApiRequest;
use crate::stage::Stage;

/// Validates one request container against a schema.
#[derive(Clone)]
pub struct ValidationStage {
    schema: Arc<dyn ParseSchema>,
    target: ValidationTarget,
}

/// Creates a validation stage for `target`.
pub fn validate<S: ParseSchema>(schema: S, target: ValidationTarget) -> ValidationStage {
    ValidationStage::new(schema).with_target(target)
}

impl ValidationStage {
    /// Creates a stage that validates the request body.
    pub fn new<S: ParseSchema>(schema: S) -> Self {
        Self::shared(Arc::new(schema), ValidationTarget::default())
    }

    /// Creates a stage from a schema shared with other stages or routes.
    #[must_use]
    pub fn shared(schema: Arc<dyn ParseSchema>, target: ValidationTarget) -> Self {
        Self { schema, target }
    }

    /// Selects the container to validate.
    #[must_use]
    pub fn with_target(mut self, target: ValidationTarget) -> Self {
        self.target = target;
        self
    }

    /// Returns the container this stage validates.
    #[must_use]
    pub fn target(&self) -> ValidationTarget {
        self.target
    }
}

impl Stage for ValidationStage {
    fn name(&self) -> &'static str {
        "validation"
    }

    fn process(&self, ctx: &mut RequestContext, request: &mut ApiRequest) -> PipelineResult<()> {
        let target = self.target;

        match self.schema.parse(request.target(target)) {
            Ok(parsed) => {
                request.replace_target(target, parsed);
                Ok(())
            }
            Err(issues) => {
                tracing::debug!(
                    request_id = ctx.request_id().map(|id| id.as_str()),
                    target = target.as_str(),
                    issue_count = issues.len(),
                    "Request validation failed"
                );
                record_validation_issues(target.as_str(), issues.len());
                Err(PipelineFailure::validation(target, issues))
            }
        }
    }
}

impl std::fmt::Debug for ValidationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationStage")
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}
