//! # Heraldo Schema
//!
//! Declarative schemas for validating and normalizing request data.
//!
//! A [`Schema`] describes the expected shape of a JSON value: its type,
//! whether it may be absent, refinements on its content, and (for objects)
//! what to do with keys it does not declare. Parsing is a pure function of
//! the schema and the input: it either returns the canonical parsed value
//! (trimmed, coerced, defaulted, unknown keys handled) or the full, ordered
//! list of [`Issue`]s.
//!
//! ## Example
//!
//! ```
//! use heraldo_schema::{Schema, SchemaExt};
//! use serde_json::json;
//!
//! let schema: Schema = Schema::object()
//!     .field("name", Schema::string().trim().min_len(1))
//!     .field("age", Schema::number())
//!     .field("plan", Schema::enumeration(["basic", "premium"]).default(json!("basic")))
//!     .into();
//!
//! let parsed = schema.parse(&json!({ "name": "  Ana ", "age": 30 })).unwrap();
//! assert_eq!(parsed, json!({ "name": "Ana", "age": 30, "plan": "basic" }));
//!
//! let issues = schema.parse(&json!({})).unwrap_err();
//! let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
//! assert_eq!(paths, ["name", "age"]);
//! ```
//!
//! ## Unknown fields
//!
//! Every object schema carries an explicit [`UnknownFields`] policy:
//!
//! | Policy | Effect on undeclared keys |
//! |--------|---------------------------|
//! | `Strip` (default) | removed from the parsed value |
//! | `Reject` | one `unrecognized_keys` issue at the object's path |
//! | `Passthrough` | copied to the parsed value unchanged |

#![doc(html_root_url = "https://docs.rs/heraldo-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod object;
mod parse;
mod path;
mod schema;

pub use error::SchemaError;
pub use heraldo_core::{Issue, IssueCode};
pub use object::{ObjectSchema, UnknownFields};
pub use path::IssuePath;
pub use schema::{
    ArraySchema, BooleanSchema, NumberSchema, ParseSchema, RefineContext, Schema, SchemaExt,
    StringSchema,
};
