//! Object schemas and the unknown-field policy.

use crate::schema::Schema;
use indexmap::IndexMap;

/// What an object schema does with keys it does not declare.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UnknownFields {
    /// Drop undeclared keys from the parsed value.
    #[default]
    Strip,
    /// Fail with a single `unrecognized_keys` issue listing them.
    Reject,
    /// Keep undeclared keys in the parsed value as they were.
    Passthrough,
}

/// Builder for object schemas.
///
/// Fields are evaluated in declaration order, which is also the order of the
/// issues they produce and of the keys in the parsed value.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    pub(crate) fields: IndexMap<String, Schema>,
    pub(crate) unknown: UnknownFields,
}

impl ObjectSchema {
    pub(crate) fn new() -> Self {
        <Self as Default>::default()
    }

    /// Declares a field. Declaring the same name twice replaces the schema
    /// but keeps the original position.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, schema: impl Into<Schema>) -> Self {
        self.fields.insert(name.into(), schema.into());
        self
    }

    /// Sets the unknown-field policy.
    #[must_use]
    pub fn unknown_fields(mut self, policy: UnknownFields) -> Self {
        self.unknown = policy;
        self
    }

    /// Shorthand for [`UnknownFields::Reject`].
    #[must_use]
    pub fn strict(self) -> Self {
        self.unknown_fields(UnknownFields::Reject)
    }

    /// Shorthand for [`UnknownFields::Passthrough`].
    #[must_use]
    pub fn passthrough(self) -> Self {
        self.unknown_fields(UnknownFields::Passthrough)
    }

    /// Makes every declared field optional and drops field defaults, so an
    /// absent field stays absent. Useful for update payloads built from a
    /// create schema.
    #[must_use]
    pub fn partial(mut self) -> Self {
        for schema in self.fields.values_mut() {
            schema.optional = true;
            schema.default = None;
        }
        self
    }

    /// Returns the unknown-field policy.
    #[must_use]
    pub fn policy(&self) -> UnknownFields {
        self.unknown
    }

    /// Returns the declared field names in evaluation order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}
