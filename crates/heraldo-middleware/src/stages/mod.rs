//! Built-in pipeline steps.
//!
//! 1. [`request_id`] - assign and echo the request identifier
//! 2. [`validation`] - zero or more schema validation stages, in order
//! 3. [`error_normalization`] - turn any failure into the error envelope

pub mod error_normalization;
pub mod request_id;
pub mod validation;

pub use error_normalization::ErrorNormalizer;
pub use request_id::{RequestIdStage, REQUEST_ID_HEADER};
pub use validation::{validate, ValidationStage};
