//! Schema model and builders.
//!
//! Kind-specific refinements live on typed builders ([`StringSchema`],
//! [`NumberSchema`], [`BooleanSchema`], [`ArraySchema`], [`ObjectSchema`]);
//! presence modifiers (`optional`, `nullable`, `default`), custom
//! refinements and value hooks (`preprocess`, `transform`) come from
//! [`SchemaExt`], which every builder implements through its conversion
//! into [`Schema`].

use crate::error::SchemaError;
use crate::object::ObjectSchema;
use crate::parse::{self, Outcome};
use crate::path::IssuePath;
use heraldo_core::Issue;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Anything that can turn raw request data into validated data.
///
/// [`Schema`] is the built-in implementation; other schema sources can be
/// plugged into the validation stage by implementing this trait. Parsing must
/// be deterministic and free of shared mutable state.
pub trait ParseSchema: Send + Sync + 'static {
    /// Parses `input`, returning the canonical value or every issue found.
    fn parse(&self, input: &Value) -> Result<Value, Vec<Issue>>;
}

/// Custom refinement run after a value parsed successfully.
pub(crate) type Refinement = Arc<dyn Fn(&Value, &mut RefineContext<'_>) + Send + Sync>;

/// Rewrites a present input before parsing; `None` makes it absent.
pub(crate) type Preprocess = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Rewrites a parsed value after its refinements passed.
pub(crate) type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Collects issues raised by a custom refinement.
///
/// Issue paths are relative to the refined value.
pub struct RefineContext<'a> {
    path: &'a IssuePath,
    issues: Vec<Issue>,
}

impl<'a> RefineContext<'a> {
    pub(crate) fn new(path: &'a IssuePath) -> Self {
        Self {
            path,
            issues: Vec::new(),
        }
    }

    /// Adds an issue at the refined value's own path.
    pub fn add_issue(&mut self, message: impl Into<String>) {
        self.issues.push(Issue::custom(self.path.render(), message));
    }

    /// Adds an issue at a child of the refined value (e.g. a field name).
    pub fn add_issue_at(&mut self, child: &str, message: impl Into<String>) {
        self.issues.push(Issue::custom(self.path.join(child), message));
    }

    pub(crate) fn into_issues(self) -> Vec<Issue> {
        self.issues
    }
}

/// A declarative description of an expected JSON value.
///
/// Schemas are immutable once built and cheap to clone; share them across
/// routes and threads freely.
#[derive(Clone)]
pub struct Schema {
    pub(crate) kind: Kind,
    pub(crate) optional: bool,
    pub(crate) nullable: bool,
    pub(crate) default: Option<Value>,
    pub(crate) refinements: Vec<Refinement>,
    pub(crate) preprocess: Option<Preprocess>,
    pub(crate) transforms: Vec<Transform>,
}

#[derive(Debug, Clone)]
pub(crate) enum Kind {
    Any,
    String(StringSchema),
    Number(NumberSchema),
    Boolean(BooleanSchema),
    Enum(Vec<String>),
    Literal(Value),
    Array(ArraySchema),
    Object(ObjectSchema),
    Record(Box<Schema>),
    Union(Vec<Schema>),
}

impl Kind {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::String(_) | Self::Enum(_) => "string",
            Self::Number(rules) if rules.integer => "integer",
            Self::Number(_) => "number",
            Self::Boolean(_) => "boolean",
            Self::Literal(_) => "literal",
            Self::Array(_) => "array",
            Self::Object(_) | Self::Record(_) => "object",
            Self::Union(_) => "union",
        }
    }
}

impl Schema {
    fn from_kind(kind: Kind) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
            default: None,
            refinements: Vec::new(),
            preprocess: None,
            transforms: Vec::new(),
        }
    }

    /// Accepts any value unchanged.
    #[must_use]
    pub fn any() -> Self {
        Self::from_kind(Kind::Any)
    }

    /// A string schema.
    #[must_use]
    pub fn string() -> StringSchema {
        <StringSchema as Default>::default()
    }

    /// A number schema (integers and floats).
    #[must_use]
    pub fn number() -> NumberSchema {
        <NumberSchema as Default>::default()
    }

    /// A number schema restricted to integers.
    #[must_use]
    pub fn integer() -> NumberSchema {
        Self::number().int()
    }

    /// A boolean schema.
    #[must_use]
    pub fn boolean() -> BooleanSchema {
        <BooleanSchema as Default>::default()
    }

    /// A string restricted to the given members.
    #[must_use]
    pub fn enumeration<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_kind(Kind::Enum(members.into_iter().map(Into::into).collect()))
    }

    /// A value that must equal `value` exactly.
    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::from_kind(Kind::Literal(value.into()))
    }

    /// An array whose elements match `items`.
    #[must_use]
    pub fn array(items: impl Into<Schema>) -> ArraySchema {
        ArraySchema::new(items.into())
    }

    /// An object schema with no declared fields yet.
    #[must_use]
    pub fn object() -> ObjectSchema {
        ObjectSchema::new()
    }

    /// An object with arbitrary keys whose values all match `values`.
    #[must_use]
    pub fn record(values: impl Into<Schema>) -> Self {
        Self::from_kind(Kind::Record(Box::new(values.into())))
    }

    /// A value matching at least one of `options`, tried in order.
    ///
    /// The first option that parses cleanly provides the output. When none
    /// does, the issues of the first option that had the right shape and
    /// only failed a check (length, bound, format or refinement) are
    /// reported; failing that, a single `invalid_union` issue.
    ///
    /// # Example
    ///
    /// ```
    /// use heraldo_schema::Schema;
    /// use serde_json::json;
    ///
    /// let param = Schema::union([Schema::from(Schema::string()), Schema::number().into()]);
    /// assert!(param.parse(&json!("abc")).is_ok());
    /// assert!(param.parse(&json!(12)).is_ok());
    /// assert!(param.parse(&json!(true)).is_err());
    /// ```
    #[must_use]
    pub fn union<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Schema>,
    {
        Self::from_kind(Kind::Union(options.into_iter().map(Into::into).collect()))
    }

    /// Returns `true` if the value may be absent.
    #[must_use]
    pub fn is_optional(&self) -> bool {
        self.optional || self.default.is_some()
    }

    /// Returns the name of the expected type.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.kind.name()
    }

    /// Parses `input` against this schema.
    ///
    /// On success the returned value is the canonical parsed form; on failure
    /// every issue is returned in evaluation order.
    pub fn parse(&self, input: &Value) -> Result<Value, Vec<Issue>> {
        let mut path = IssuePath::root();
        let mut issues = Vec::new();
        match parse::parse_value(self, Some(input), &mut path, &mut issues) {
            Outcome::Valid(value) if issues.is_empty() => Ok(value),
            Outcome::Absent if issues.is_empty() => Ok(Value::Null),
            _ => Err(issues),
        }
    }
}

impl ParseSchema for Schema {
    fn parse(&self, input: &Value) -> Result<Value, Vec<Issue>> {
        Schema::parse(self, input)
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("kind", &self.kind)
            .field("optional", &self.optional)
            .field("nullable", &self.nullable)
            .field("default", &self.default)
            .field("refinements", &self.refinements.len())
            .field("preprocess", &self.preprocess.is_some())
            .field("transforms", &self.transforms.len())
            .finish()
    }
}

/// Presence modifiers and custom refinements, available on every builder.
pub trait SchemaExt: Into<Schema> + Sized {
    /// Allows the value to be absent; absent values are left out of the output.
    fn optional(self) -> Schema {
        let mut schema = self.into();
        schema.optional = true;
        schema
    }

    /// Allows an explicit JSON `null`.
    fn nullable(self) -> Schema {
        let mut schema = self.into();
        schema.nullable = true;
        schema
    }

    /// Substitutes `value` when the input is absent. The default is parsed
    /// like any other input, so it must satisfy the schema itself.
    fn default(self, value: impl Into<Value>) -> Schema {
        let mut schema = self.into();
        schema.default = Some(value.into());
        schema
    }

    /// Adds a refinement that runs once the value parsed successfully.
    ///
    /// # Example
    ///
    /// ```
    /// use heraldo_schema::{Schema, SchemaExt};
    /// use serde_json::json;
    ///
    /// let range = Schema::object()
    ///     .field("from", Schema::integer())
    ///     .field("to", Schema::integer())
    ///     .refine(|value, ctx| {
    ///         if value["from"].as_i64() >= value["to"].as_i64() {
    ///             ctx.add_issue_at("to", "Must be after from");
    ///         }
    ///     });
    ///
    /// let issues = range.parse(&json!({ "from": 5, "to": 1 })).unwrap_err();
    /// assert_eq!(issues[0].path, "to");
    /// ```
    fn refine<F>(self, refinement: F) -> Schema
    where
        F: Fn(&Value, &mut RefineContext<'_>) + Send + Sync + 'static,
    {
        let mut schema = self.into();
        schema.refinements.push(Arc::new(refinement));
        schema
    }

    /// Rewrites a present input before anything else looks at it. Returning
    /// `None` treats the value as absent, so `optional` and `default` apply.
    /// A later call replaces an earlier one.
    fn preprocess<F>(self, preprocess: F) -> Schema
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        let mut schema = self.into();
        schema.preprocess = Some(Arc::new(preprocess));
        schema
    }

    /// Maps the parsed value once every refinement passed. Transforms run
    /// in the order they were added.
    ///
    /// # Example
    ///
    /// ```
    /// use heraldo_schema::{Schema, SchemaExt};
    /// use serde_json::{json, Value};
    ///
    /// let flag = Schema::union([Schema::literal("true"), Schema::literal("false")])
    ///     .transform(|value| Value::Bool(value == "true"));
    /// assert_eq!(flag.parse(&json!("true")).unwrap(), json!(true));
    /// assert!(flag.parse(&json!("yes")).is_err());
    /// ```
    fn transform<F>(self, transform: F) -> Schema
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        let mut schema = self.into();
        schema.transforms.push(Arc::new(transform));
        schema
    }
}

impl<T: Into<Schema>> SchemaExt for T {}

// ============================================================================
// String
// ============================================================================

/// Builder for string schemas.
#[derive(Debug, Clone, Default)]
pub struct StringSchema {
    pub(crate) coerce: bool,
    pub(crate) trim: bool,
    pub(crate) lowercase: bool,
    pub(crate) min_len: Option<usize>,
    pub(crate) max_len: Option<usize>,
    pub(crate) pattern: Option<(Regex, String)>,
    pub(crate) email: bool,
    pub(crate) url: bool,
}

impl StringSchema {
    /// Converts numbers and booleans to their string form.
    #[must_use]
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Trims surrounding whitespace before any length check.
    #[must_use]
    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    /// Lowercases the value before any check.
    #[must_use]
    pub fn lowercase(mut self) -> Self {
        self.lowercase = true;
        self
    }

    /// Minimum length in characters.
    #[must_use]
    pub fn min_len(mut self, len: usize) -> Self {
        self.min_len = Some(len);
        self
    }

    /// Maximum length in characters.
    #[must_use]
    pub fn max_len(mut self, len: usize) -> Self {
        self.max_len = Some(len);
        self
    }

    /// Requires the value to match `regex`.
    #[must_use]
    pub fn pattern(self, regex: Regex) -> Self {
        self.pattern_with_message(regex, "Invalid")
    }

    /// Requires the value to match `regex`, reporting `message` otherwise.
    #[must_use]
    pub fn pattern_with_message(mut self, regex: Regex, message: impl Into<String>) -> Self {
        self.pattern = Some((regex, message.into()));
        self
    }

    /// Compiles `pattern` and requires the value to match it.
    pub fn pattern_str(self, pattern: &str) -> Result<Self, SchemaError> {
        let regex = Regex::new(pattern).map_err(|source| SchemaError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(self.pattern(regex))
    }

    /// Requires a plausible e-mail address.
    #[must_use]
    pub fn email(mut self) -> Self {
        self.email = true;
        self
    }

    /// Requires an absolute URL (`scheme:rest`).
    #[must_use]
    pub fn url(mut self) -> Self {
        self.url = true;
        self
    }
}

impl From<StringSchema> for Schema {
    fn from(rules: StringSchema) -> Self {
        Self::from_kind(Kind::String(rules))
    }
}

// ============================================================================
// Number
// ============================================================================

/// Builder for number schemas.
#[derive(Debug, Clone, Default)]
pub struct NumberSchema {
    pub(crate) coerce: bool,
    pub(crate) integer: bool,
    pub(crate) min: Option<f64>,
    pub(crate) max: Option<f64>,
}

impl NumberSchema {
    /// Parses numeric strings (as query and path values always are).
    #[must_use]
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Rejects values with a fractional part.
    #[must_use]
    pub fn int(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Inclusive lower bound.
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound.
    #[must_use]
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Inclusive range; fails if `min > max`.
    pub fn range(self, min: f64, max: f64) -> Result<Self, SchemaError> {
        if min > max {
            return Err(SchemaError::InvalidRange { min, max });
        }
        Ok(self.min(min).max(max))
    }
}

impl From<NumberSchema> for Schema {
    fn from(rules: NumberSchema) -> Self {
        Self::from_kind(Kind::Number(rules))
    }
}

// ============================================================================
// Boolean
// ============================================================================

/// Builder for boolean schemas.
#[derive(Debug, Clone, Default)]
pub struct BooleanSchema {
    pub(crate) coerce: bool,
}

impl BooleanSchema {
    /// Accepts the strings `"true"` and `"false"`.
    #[must_use]
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }
}

impl From<BooleanSchema> for Schema {
    fn from(rules: BooleanSchema) -> Self {
        Self::from_kind(Kind::Boolean(rules))
    }
}

// ============================================================================
// Array
// ============================================================================

/// Builder for array schemas.
#[derive(Debug, Clone)]
pub struct ArraySchema {
    pub(crate) items: Box<Schema>,
    pub(crate) min_items: Option<usize>,
    pub(crate) max_items: Option<usize>,
    pub(crate) wrap_single: bool,
}

impl ArraySchema {
    fn new(items: Schema) -> Self {
        Self {
            items: Box::new(items),
            min_items: None,
            max_items: None,
            wrap_single: false,
        }
    }

    /// Minimum number of elements.
    #[must_use]
    pub fn min_items(mut self, n: usize) -> Self {
        self.min_items = Some(n);
        self
    }

    /// Maximum number of elements.
    #[must_use]
    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }

    /// Treats a lone non-array value as a one-element array.
    ///
    /// A query string such as `?services=a` carries a single string while
    /// `?services=a&services=b` carries two; this folds both into an array.
    /// A blank string (`?services=`) counts as absent.
    #[must_use]
    pub fn wrap_single(mut self) -> Self {
        self.wrap_single = true;
        self
    }
}

impl From<ArraySchema> for Schema {
    fn from(rules: ArraySchema) -> Self {
        Self::from_kind(Kind::Array(rules))
    }
}

impl From<ObjectSchema> for Schema {
    fn from(object: ObjectSchema) -> Self {
        Self::from_kind(Kind::Object(object))
    }
}
