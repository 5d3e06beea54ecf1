//! Turns a JSON request body into a [`TodoInput`].
//!
//! Every field is checked so that a single 400 response reports all of the
//! problems in the body at once. Unknown keys and the read-only `id` are
//! ignored.

use serde_json::{Map, Value};

use crate::error::{AppError, FieldErrors, NON_FIELD_ERRORS};
use crate::models::TodoInput;

const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_STRING: &str = "Not a valid string.";
const NOT_BOOLEAN: &str = "Must be a valid boolean.";

/// Whether omitted fields are an error (create, PUT) or left alone (PATCH).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Full,
    Partial,
}

pub fn validate(body: Value, mode: Mode) -> Result<TodoInput, AppError> {
    let fields = match body {
        Value::Object(fields) => fields,
        other => {
            return Err(AppError::field(
                NON_FIELD_ERRORS,
                format!(
                    "Invalid data. Expected a dictionary, but got {}.",
                    type_name(&other)
                ),
            ))
        }
    };

    let mut errors = FieldErrors::new();
    let title = check(&fields, "title", mode == Mode::Full, &mut errors, title_value);
    // `completed` has a default, so it is never required
    let completed = check(&fields, "completed", false, &mut errors, |v| {
        boolean_value(v).ok_or(NOT_BOOLEAN)
    });

    if errors.is_empty() {
        Ok(TodoInput { title, completed })
    } else {
        Err(AppError::Validation(errors))
    }
}

fn check<T>(
    fields: &Map<String, Value>,
    name: &str,
    required: bool,
    errors: &mut FieldErrors,
    parse: impl Fn(&Value) -> Result<T, &'static str>,
) -> Option<T> {
    let outcome = match fields.get(name) {
        None if required => Err(REQUIRED),
        None => return None,
        Some(Value::Null) => Err(NOT_NULL),
        Some(value) => parse(value),
    };
    match outcome {
        Ok(value) => Some(value),
        Err(message) => {
            errors.insert(name.to_string(), vec![message.to_string()]);
            None
        }
    }
}

fn title_value(value: &Value) -> Result<String, &'static str> {
    let title = value.as_str().ok_or(NOT_STRING)?.trim();
    if title.is_empty() {
        return Err(NOT_BLANK);
    }
    Ok(title.to_string())
}

/// Accepts JSON booleans and the usual textual and numeric spellings.
pub fn boolean_value(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(1) => Some(true),
            Some(0) => Some(false),
            _ => None,
        },
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "on" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "off" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
