//! # Heraldo Core
//!
//! Core types shared by every crate of the Heraldo request pipeline.
//!
//! - [`RequestId`] - Opaque per-request identifier (random UUID v4 when generated)
//! - [`ValidationTarget`] - Which part of a request a schema applies to
//! - [`Issue`] - A single field-level validation problem
//! - [`PipelineFailure`] - The tagged failure taxonomy (validation vs. handler)
//! - [`NormalizedError`] - The one shape ever returned to a caller on failure

#![doc(html_root_url = "https://docs.rs/heraldo-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;
mod issue;
mod target;

pub use context::{RequestId, MAX_REQUEST_ID_LEN};
pub use error::{
    ErrorDetail, ErrorEnvelope, NormalizedError, PipelineFailure, PipelineResult,
    DEFAULT_INTERNAL_MESSAGE,
};
pub use issue::{Issue, IssueCode};
pub use target::ValidationTarget;
