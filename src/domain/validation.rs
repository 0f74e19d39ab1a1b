use std::fmt;

use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Every problem found by the field-spec checker, in declaration order.
    Fields { problems: Vec<String> },
    Empty { field: &'static str },
    InvalidInput { kind: &'static str },
    UnsupportedField { field: &'static str },
    Conflict { first: &'static str, second: &'static str },
    MissingDependency { field: &'static str, requires: &'static str },
    InvalidDevice,
    UnknownPriority { value: String },
    RequiresEmergency { field: &'static str },
    UnknownSound { value: String },
    InvalidBaseUrl { url: String, reason: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fields { problems } => f.write_str(&problems.join("\n")),
            Self::Empty { field } => write!(f, "{field} must not be empty"),
            Self::InvalidInput { kind } => {
                write!(f, "message must be a string or an object, got {kind}")
            }
            Self::UnsupportedField { field } => write!(f, "{field} is not supported"),
            Self::Conflict { first, second } => {
                write!(f, "{first} and {second} are mutually exclusive")
            }
            Self::MissingDependency { field, requires } => {
                write!(f, "{field} requires {requires} to be set")
            }
            Self::InvalidDevice => f.write_str("device must be a string or a list of strings"),
            Self::UnknownPriority { value } => write!(f, "unknown priority: {value}"),
            Self::RequiresEmergency { field } => {
                write!(f, "{field} requires emergency priority")
            }
            Self::UnknownSound { value } => write!(f, "unknown sound: {value}"),
            Self::InvalidBaseUrl { url, reason } => write!(f, "invalid base_url {url:?}: {reason}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Expected JSON type of a declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldType {
    String,
    Number,
    Boolean,
    StringOrNumber,
    Any,
}

impl FieldType {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::StringOrNumber => value.is_string() || value.is_number(),
            Self::Any => true,
        }
    }

    fn describe(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::StringOrNumber => "a string or a number",
            Self::Any => "any value",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct FieldSpec {
    pub name: &'static str,
    pub ty: FieldType,
    pub required: bool,
}

impl FieldSpec {
    pub(crate) const fn required(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: true,
        }
    }

    pub(crate) const fn optional(name: &'static str, ty: FieldType) -> Self {
        Self {
            name,
            ty,
            required: false,
        }
    }
}

/// Check `fields` against `specs`, collecting every violation rather than stopping at the first.
///
/// A JSON `null` counts as absent. Fields not named in `specs` are ignored.
pub(crate) fn check_fields(
    namespace: &str,
    specs: &[FieldSpec],
    fields: &Map<String, Value>,
) -> Result<(), ValidationError> {
    let mut problems = Vec::new();

    for spec in specs {
        match fields.get(spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    problems.push(format!("{namespace}.{} is required", spec.name));
                }
            }
            Some(value) if !spec.ty.matches(value) => problems.push(format!(
                "{namespace}.{} must be {}, got {}",
                spec.name,
                spec.ty.describe(),
                kind_of(value)
            )),
            Some(Value::String(text)) if text.is_empty() => {
                problems.push(format!("{namespace}.{} must not be empty", spec.name));
            }
            Some(_) => {}
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::Fields { problems })
    }
}

/// Integer value of `number`, also for floats with no fractional part (`2.0`).
pub(crate) fn exact_integer(number: &Number) -> Option<i64> {
    if let Some(value) = number.as_i64() {
        return Some(value);
    }
    let value = number.as_f64()?;
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

pub(crate) fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
