//! The pre-handler stage abstraction.
//!
//! A [`Stage`] inspects or rewrites the decoded request before the handler
//! runs. Stages are synchronous and never call each other: the
//! [`Pipeline`](crate::Pipeline) dispatcher runs them in declaration order
//! and stops at the first failure.

use heraldo_core::PipelineResult;

use crate::context::RequestContext;
use crate::request::ApiRequest;

/// A single pre-handler step.
///
/// # Example
///
/// ```
/// use heraldo_core::{PipelineFailure, PipelineResult};
/// use heraldo_middleware::{ApiRequest, RequestContext, Stage};
///
/// struct RequireTenant;
///
/// impl Stage for RequireTenant {
///     fn name(&self) -> &'static str {
///         "require_tenant"
///     }
///
///     fn process(&self, _ctx: &mut RequestContext, request: &mut ApiRequest) -> PipelineResult<()> {
///         match request.header("x-tenant") {
///             Some(_) => Ok(()),
///             None => Err(PipelineFailure::with_status(401, "Missing tenant")),
///         }
///     }
/// }
/// ```
pub trait Stage: Send + Sync + 'static {
    /// Name used in logs and by [`Pipeline::stage_names`](crate::Pipeline::stage_names).
    fn name(&self) -> &'static str;

    /// Runs the stage. Returning `Err` short-circuits the pipeline.
    fn process(&self, ctx: &mut RequestContext, request: &mut ApiRequest) -> PipelineResult<()>;
}

/// A stage built from a closure.
pub struct FnStage<F> {
    name: &'static str,
    f: F,
}

impl<F> FnStage<F>
where
    F: Fn(&mut RequestContext, &mut ApiRequest) -> PipelineResult<()> + Send + Sync + 'static,
{
    /// Creates a named stage from a closure.
    pub fn new(name: &'static str, f: F) -> Self {
        Self { name, f }
    }
}

impl<F> Stage for FnStage<F>
where
    F: Fn(&mut RequestContext, &mut ApiRequest) -> PipelineResult<()> + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    fn process(&self, ctx: &mut RequestContext, request: &mut ApiRequest) -> PipelineResult<()> {
        (self.f)(ctx, request)
    }
}

impl<F> std::fmt::Debug for FnStage<F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnStage").field("name", &self.name).finish()
    }
}
