//! Parsing engine.
//!
//! Every function here is pure: the result depends only on the schema and the
//! input. Issues are appended to a caller-owned vector in evaluation order;
//! evaluation never stops at the first issue, so a caller sees every problem
//! in one pass.

use crate::object::{ObjectSchema, UnknownFields};
use crate::path::IssuePath;
use crate::schema::{ArraySchema, BooleanSchema, Kind, NumberSchema, RefineContext, Schema, StringSchema};
use heraldo_core::{Issue, IssueCode};
use serde_json::{Map, Number, Value};

/// Result of parsing one value.
#[derive(Debug)]
pub(crate) enum Outcome {
    /// Parsed value to place in the output.
    Valid(Value),
    /// Absent and allowed to be; leave it out of the output.
    Absent,
    /// At least one issue was recorded.
    Invalid,
}

pub(crate) fn parse_value(
    schema: &Schema,
    input: Option<&Value>,
    path: &mut IssuePath,
    issues: &mut Vec<Issue>,
) -> Outcome {
    let preprocessed;
    let input = match (&schema.preprocess, input) {
        (Some(preprocess), Some(raw)) => {
            preprocessed = preprocess(raw);
            preprocessed.as_ref()
        }
        (_, input) => input,
    };

    let input = match input.filter(|value| !is_blank_single(schema, value)) {
        Some(value) => value,
        None => match &schema.default {
            Some(default) => default,
            None if schema.optional => return Outcome::Absent,
            None => {
                issues.push(Issue::required(path.render()));
                return Outcome::Invalid;
            }
        },
    };

    if input.is_null() && schema.nullable {
        return Outcome::Valid(Value::Null);
    }

    let before = issues.len();
    let parsed = match &schema.kind {
        Kind::Any => Some(input.clone()),
        Kind::String(rules) => parse_string(rules, input, path, issues),
        Kind::Number(rules) => parse_number(rules, input, path, issues),
        Kind::Boolean(rules) => parse_boolean(rules, input, path, issues),
        Kind::Enum(members) => parse_enum(members, input, path, issues),
        Kind::Literal(expected) => parse_literal(expected, input, path, issues),
        Kind::Array(rules) => parse_array(rules, input, path, issues),
        Kind::Object(object) => parse_object(object, input, path, issues),
        Kind::Record(values) => parse_record(values, input, path, issues),
        Kind::Union(options) => parse_union(options, input, path, issues),
    };

    let Some(mut value) = parsed.filter(|_| issues.len() == before) else {
        return Outcome::Invalid;
    };

    if !schema.refinements.is_empty() {
        let mut ctx = RefineContext::new(path);
        for refinement in &schema.refinements {
            refinement(&value, &mut ctx);
        }
        let raised = ctx.into_issues();
        if !raised.is_empty() {
            issues.extend(raised);
            return Outcome::Invalid;
        }
    }

    for transform in &schema.transforms {
        value = transform(value);
    }

    Outcome::Valid(value)
}

/// A blank string given to a `wrap_single` array, as `?services=` produces.
fn is_blank_single(schema: &Schema, value: &Value) -> bool {
    matches!(&schema.kind, Kind::Array(rules) if rules.wrap_single)
        && matches!(value, Value::String(s) if s.trim().is_empty())
}

/// JSON type name used in "Expected X, received Y" messages.
fn received(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn invalid_type(path: &IssuePath, expected: &str, value: &Value, issues: &mut Vec<Issue>) {
    issues.push(Issue::new(
        path.render(),
        IssueCode::InvalidType,
        format!("Expected {expected}, received {}", received(value)),
    ));
}

fn parse_string(
    rules: &StringSchema,
    input: &Value,
    path: &IssuePath,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let mut text = match input {
        Value::String(s) => s.clone(),
        Value::Number(n) if rules.coerce => n.to_string(),
        Value::Bool(b) if rules.coerce => b.to_string(),
        other => {
            invalid_type(path, "string", other, issues);
            return None;
        }
    };

    if rules.trim {
        text = text.trim().to_string();
    }
    if rules.lowercase {
        text = text.to_lowercase();
    }

    let len = text.chars().count();
    if let Some(min) = rules.min_len.filter(|min| len < *min) {
        issues.push(Issue::new(
            path.render(),
            IssueCode::TooSmall,
            format!("String must contain at least {min} character(s)"),
        ));
    }
    if let Some(max) = rules.max_len.filter(|max| len > *max) {
        issues.push(Issue::new(
            path.render(),
            IssueCode::TooBig,
            format!("String must contain at most {max} character(s)"),
        ));
    }
    if let Some((regex, message)) = &rules.pattern {
        if !regex.is_match(&text) {
            issues.push(Issue::new(path.render(), IssueCode::InvalidString, message.clone()));
        }
    }
    if rules.email && !looks_like_email(&text) {
        issues.push(Issue::new(path.render(), IssueCode::InvalidString, "Invalid email"));
    }
    if rules.url && !looks_like_url(&text) {
        issues.push(Issue::new(path.render(), IssueCode::InvalidString, "Invalid url"));
    }

    Some(Value::String(text))
}

fn looks_like_email(text: &str) -> bool {
    let Some((local, domain)) = text.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !text.chars().any(char::is_whitespace)
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

fn looks_like_url(text: &str) -> bool {
    let Some((scheme, rest)) = text.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let scheme_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    scheme_ok && !rest.is_empty() && !text.chars().any(char::is_whitespace)
}

fn parse_number(
    rules: &NumberSchema,
    input: &Value,
    path: &IssuePath,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let (number, output) = match input {
        Value::Number(n) => match n.as_f64() {
            Some(f) => (f, input.clone()),
            None => {
                invalid_type(path, "number", input, issues);
                return None;
            }
        },
        Value::String(s) if rules.coerce => match s.trim().parse::<f64>() {
            Ok(n) if !s.trim().is_empty() && n.is_finite() => (n, number_value(n)),
            _ => {
                issues.push(Issue::new(
                    path.render(),
                    IssueCode::InvalidType,
                    "Expected number, received nan",
                ));
                return None;
            }
        },
        other => {
            invalid_type(path, "number", other, issues);
            return None;
        }
    };

    if rules.integer && number.fract() != 0.0 {
        issues.push(Issue::new(
            path.render(),
            IssueCode::InvalidType,
            "Expected integer, received float",
        ));
        return None;
    }
    if let Some(min) = rules.min.filter(|min| number < *min) {
        issues.push(Issue::new(
            path.render(),
            IssueCode::TooSmall,
            format!("Number must be greater than or equal to {min}"),
        ));
    }
    if let Some(max) = rules.max.filter(|max| number > *max) {
        issues.push(Issue::new(
            path.render(),
            IssueCode::TooBig,
            format!("Number must be less than or equal to {max}"),
        ));
    }

    Some(output)
}

/// Canonical JSON form of a coerced number: integral values become integers.
#[allow(clippy::cast_possible_truncation)]
fn number_value(n: f64) -> Value {
    // i64::MAX rounds up to 2^63 as f64, so the upper bound is exclusive.
    if n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn parse_boolean(
    rules: &BooleanSchema,
    input: &Value,
    path: &IssuePath,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    match input {
        Value::Bool(_) => Some(input.clone()),
        Value::String(s) if rules.coerce && s == "true" => Some(Value::Bool(true)),
        Value::String(s) if rules.coerce && s == "false" => Some(Value::Bool(false)),
        other => {
            invalid_type(path, "boolean", other, issues);
            None
        }
    }
}

fn parse_enum(
    members: &[String],
    input: &Value,
    path: &IssuePath,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let Value::String(s) = input else {
        invalid_type(path, "string", input, issues);
        return None;
    };
    if members.iter().any(|m| m == s) {
        return Some(input.clone());
    }
    let expected = members
        .iter()
        .map(|m| format!("'{m}'"))
        .collect::<Vec<_>>()
        .join(" | ");
    issues.push(Issue::new(
        path.render(),
        IssueCode::InvalidEnumValue,
        format!("Invalid enum value. Expected {expected}, received '{s}'"),
    ));
    None
}

fn parse_literal(
    expected: &Value,
    input: &Value,
    path: &IssuePath,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    if input == expected {
        return Some(input.clone());
    }
    issues.push(Issue::new(
        path.render(),
        IssueCode::InvalidLiteral,
        format!("Invalid literal value, expected {expected}"),
    ));
    None
}

fn parse_array(
    rules: &ArraySchema,
    input: &Value,
    path: &mut IssuePath,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let wrapped;
    let elements = match input {
        Value::Array(elements) => elements.as_slice(),
        other if rules.wrap_single && !other.is_null() => {
            wrapped = [other.clone()];
            &wrapped[..]
        }
        other => {
            invalid_type(path, "array", other, issues);
            return None;
        }
    };

    if let Some(min) = rules.min_items.filter(|min| elements.len() < *min) {
        issues.push(Issue::new(
            path.render(),
            IssueCode::TooSmall,
            format!("Array must contain at least {min} element(s)"),
        ));
    }
    if let Some(max) = rules.max_items.filter(|max| elements.len() > *max) {
        issues.push(Issue::new(
            path.render(),
            IssueCode::TooBig,
            format!("Array must contain at most {max} element(s)"),
        ));
    }

    let mut output = Vec::with_capacity(elements.len());
    let mut valid = true;
    for (index, element) in elements.iter().enumerate() {
        path.push_index(index);
        match parse_value(&rules.items, Some(element), path, issues) {
            Outcome::Valid(value) => output.push(value),
            Outcome::Absent => {}
            Outcome::Invalid => valid = false,
        }
        path.pop();
    }

    valid.then_some(Value::Array(output))
}

fn parse_object(
    object: &ObjectSchema,
    input: &Value,
    path: &mut IssuePath,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let Value::Object(fields) = input else {
        invalid_type(path, "object", input, issues);
        return None;
    };

    let mut output = Map::new();
    let mut valid = true;
    for (name, schema) in &object.fields {
        path.push_key(name);
        match parse_value(schema, fields.get(name), path, issues) {
            Outcome::Valid(value) => {
                output.insert(name.clone(), value);
            }
            Outcome::Absent => {}
            Outcome::Invalid => valid = false,
        }
        path.pop();
    }

    let unknown = fields.keys().filter(|key| !object.fields.contains_key(*key));
    match object.unknown {
        UnknownFields::Strip => {}
        UnknownFields::Passthrough => {
            for key in unknown {
                output.insert(key.clone(), fields[key].clone());
            }
        }
        UnknownFields::Reject => {
            let keys: Vec<_> = unknown.map(|key| format!("'{key}'")).collect();
            if !keys.is_empty() {
                issues.push(Issue::new(
                    path.render(),
                    IssueCode::UnrecognizedKeys,
                    format!("Unrecognized key(s) in object: {}", keys.join(", ")),
                ));
                valid = false;
            }
        }
    }

    valid.then_some(Value::Object(output))
}

fn parse_record(
    values: &Schema,
    input: &Value,
    path: &mut IssuePath,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let Value::Object(entries) = input else {
        invalid_type(path, "object", input, issues);
        return None;
    };

    let mut output = Map::new();
    let mut valid = true;
    for (key, entry) in entries {
        path.push_key(key);
        match parse_value(values, Some(entry), path, issues) {
            Outcome::Valid(value) => {
                output.insert(key.clone(), value);
            }
            Outcome::Absent => {}
            Outcome::Invalid => valid = false,
        }
        path.pop();
    }

    valid.then_some(Value::Object(output))
}

fn parse_union(
    options: &[Schema],
    input: &Value,
    path: &mut IssuePath,
    issues: &mut Vec<Issue>,
) -> Option<Value> {
    let mut first_shape_match = None;

    for option in options {
        let mut attempt = Vec::new();
        if let Outcome::Valid(value) = parse_value(option, Some(input), path, &mut attempt) {
            if attempt.is_empty() {
                return Some(value);
            }
        }
        let shape_matched = !attempt.iter().any(|issue| is_shape_mismatch(issue.code));
        if shape_matched && first_shape_match.is_none() {
            first_shape_match = Some(attempt);
        }
    }

    match first_shape_match {
        Some(attempt) => issues.extend(attempt),
        None => issues.push(Issue::new(path.render(), IssueCode::InvalidUnion, "Invalid input")),
    }
    None
}

/// Codes meaning the input has the wrong shape for a schema, as opposed to
/// the right shape failing a check.
fn is_shape_mismatch(code: IssueCode) -> bool {
    matches!(
        code,
        IssueCode::Required
            | IssueCode::InvalidType
            | IssueCode::InvalidLiteral
            | IssueCode::InvalidEnumValue
            | IssueCode::InvalidUnion
    )
}
