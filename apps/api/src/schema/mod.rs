//! Declarative shape definitions for flow inputs and model outputs.
//!
//! A schema is a list of `FieldSpec`s. The same definition is used to check
//! caller input, to check what the model sends back, and to tell the model what
//! shape to reply with (see `registry::SchemaRegistry::describe`).

use serde_json::{Map, Value};
use thiserror::Error;

pub mod registry;

pub use registry::{SchemaId, SchemaRegistry};

/// Path used in errors when the candidate itself (not one of its fields) is wrong.
const ROOT_PATH: &str = "$";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    #[error("unknown schema `{0}`")]
    UnknownSchema(SchemaId),

    #[error("missing required field `{path}`")]
    MissingField { path: String },

    #[error("field `{path}` must be {expected}, found {found}")]
    WrongType {
        path: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("field `{path}` must not be empty")]
    EmptyText { path: String },

    #[error("field `{path}` value {value} is outside {}", describe_bounds(.min, .max))]
    OutOfRange {
        path: String,
        value: f64,
        min: Option<f64>,
        max: Option<f64>,
    },

    #[error("field `{path}` has unsupported value `{value}`")]
    NotInEnum {
        path: String,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("candidate could not be represented as JSON: {0}")]
    Unrepresentable(String),
}

/// Primitive kind of a field.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Any string. With `non_blank`, whitespace-only strings are rejected.
    Text { non_blank: bool },
    Number { min: Option<f64>, max: Option<f64> },
    Array(Box<FieldKind>),
    /// Closed set of allowed string labels.
    Enum(&'static [&'static str]),
    Object(Vec<FieldSpec>),
}

#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSpec {
    pub fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// A complete object schema.
#[derive(Debug, Clone)]
pub struct Schema {
    pub fields: Vec<FieldSpec>,
}

impl Schema {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Checks `candidate` against this schema and returns the accepted value.
    ///
    /// Unknown keys are dropped and optional fields sent as `null` are treated
    /// as absent. The candidate is never modified, and validating the returned
    /// value again yields an identical value.
    pub fn validate(&self, candidate: &Value) -> Result<Value, SchemaError> {
        validate_object(&self.fields, candidate, ROOT_PATH)
    }
}

fn validate_object(fields: &[FieldSpec], candidate: &Value, path: &str) -> Result<Value, SchemaError> {
    let object = candidate.as_object().ok_or_else(|| SchemaError::WrongType {
        path: path.to_string(),
        expected: "an object",
        found: type_name(candidate),
    })?;

    let mut accepted = Map::new();
    for field in fields {
        let field_path = join_path(path, field.name);
        match object.get(field.name) {
            None | Some(Value::Null) if field.required => {
                return Err(SchemaError::MissingField { path: field_path });
            }
            None | Some(Value::Null) => {}
            Some(value) => {
                let checked = validate_kind(&field.kind, value, &field_path)?;
                accepted.insert(field.name.to_string(), checked);
            }
        }
    }

    Ok(Value::Object(accepted))
}

fn validate_kind(kind: &FieldKind, value: &Value, path: &str) -> Result<Value, SchemaError> {
    match kind {
        FieldKind::Text { non_blank } => {
            let text = value.as_str().ok_or_else(|| wrong_type(path, "a string", value))?;
            if *non_blank && text.trim().is_empty() {
                return Err(SchemaError::EmptyText {
                    path: path.to_string(),
                });
            }
            Ok(value.clone())
        }
        FieldKind::Number { min, max } => {
            let number = value.as_f64().ok_or_else(|| wrong_type(path, "a number", value))?;
            let below = min.is_some_and(|m| number < m);
            let above = max.is_some_and(|m| number > m);
            if below || above {
                return Err(SchemaError::OutOfRange {
                    path: path.to_string(),
                    value: number,
                    min: *min,
                    max: *max,
                });
            }
            Ok(value.clone())
        }
        FieldKind::Array(item) => {
            let items = value.as_array().ok_or_else(|| wrong_type(path, "an array", value))?;
            items
                .iter()
                .enumerate()
                .map(|(i, v)| validate_kind(item, v, &format!("{path}[{i}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        FieldKind::Enum(allowed) => {
            let label = value.as_str().ok_or_else(|| wrong_type(path, "a string", value))?;
            if !allowed.contains(&label) {
                return Err(SchemaError::NotInEnum {
                    path: path.to_string(),
                    value: label.to_string(),
                    allowed: *allowed,
                });
            }
            Ok(value.clone())
        }
        FieldKind::Object(fields) => validate_object(fields, value, path),
    }
}

fn wrong_type(path: &str, expected: &'static str, found: &Value) -> SchemaError {
    SchemaError::WrongType {
        path: path.to_string(),
        expected,
        found: type_name(found),
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent == ROOT_PATH {
        name.to_string()
    } else {
        format!("{parent}.{name}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn describe_bounds(min: &Option<f64>, max: &Option<f64>) -> String {
    match (*min, *max) {
        (Some(lo), Some(hi)) => format!("[{lo}, {hi}]"),
        (Some(lo), None) => format!("[{lo}, ∞)"),
        (None, Some(hi)) => format!("(-∞, {hi}]"),
        (None, None) => "(-∞, ∞)".to_string(),
    }
}
