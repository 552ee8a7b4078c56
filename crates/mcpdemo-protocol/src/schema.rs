//! Tool argument validation.
//!
//! A small JSON Schema subset, enough for the input schemas the host
//! declares for its tools:
//!
//! - Type checking (string, number, integer, boolean, object, array, null)
//! - Required field validation
//! - Enum validation
//! - Property validation for objects, including `additionalProperties: false`

use serde_json::{Map, Value};
use std::fmt;

/// Error returned when validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Path to the invalid value (e.g., `root.text`).
    pub path: String,
    /// Description of what went wrong.
    pub message: String,
}

impl ValidationError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result of schema validation.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// Validates a JSON value against a JSON Schema, collecting every error.
///
/// ```
/// use mcpdemo_protocol::schema::validate;
/// use serde_json::json;
///
/// let schema = json!({
///     "type": "object",
///     "properties": { "a": { "type": "integer" }, "b": { "type": "integer" } },
///     "required": ["a", "b"]
/// });
///
/// assert!(validate(&schema, &json!({ "a": 1, "b": 2 })).is_ok());
/// assert!(validate(&schema, &json!({ "a": 1 })).is_err());
/// ```
pub fn validate(schema: &Value, value: &Value) -> ValidationResult {
    let mut errors = Vec::new();
    validate_internal(schema, value, "root", &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_internal(schema: &Value, value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    if let Some(accept) = schema.as_bool() {
        if !accept {
            errors.push(ValidationError::new(path, "schema rejects all values"));
        }
        return;
    }

    let Some(schema_obj) = schema.as_object() else {
        return;
    };

    if let Some(type_val) = schema_obj.get("type") {
        if !validate_type(type_val, value) {
            let expected = type_val
                .as_str()
                .map(String::from)
                .unwrap_or_else(|| type_val.to_string());
            errors.push(ValidationError::new(
                path,
                format!("expected type {expected}, got {}", json_type_name(value)),
            ));
            return;
        }
    }

    if let Some(allowed) = schema_obj.get("enum").and_then(Value::as_array) {
        if !allowed.contains(value) {
            errors.push(ValidationError::new(
                path,
                format!("value must be one of: {}", Value::Array(allowed.clone())),
            ));
        }
    }

    if let Value::Object(obj) = value {
        validate_object(schema_obj, obj, path, errors);
    }
}

fn validate_type(type_val: &Value, value: &Value) -> bool {
    match type_val {
        Value::String(t) => matches_type(t, value),
        Value::Array(types) => types
            .iter()
            .any(|t| t.as_str().is_some_and(|name| matches_type(name, value))),
        _ => true,
    }
}

fn matches_type(type_name: &str, value: &Value) -> bool {
    match type_name {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_i64() || n.is_u64() => "integer",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn validate_object(
    schema: &Map<String, Value>,
    obj: &Map<String, Value>,
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    if let Some(required) = schema.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            if !obj.contains_key(name) {
                errors.push(ValidationError::new(
                    path,
                    format!("missing required field: {name}"),
                ));
            }
        }
    }

    let properties = schema.get("properties").and_then(Value::as_object);

    for (key, value) in obj {
        match properties.and_then(|p| p.get(key)) {
            Some(prop_schema) => {
                validate_internal(prop_schema, value, &format!("{path}.{key}"), errors);
            }
            None => {
                if schema.get("additionalProperties") == Some(&Value::Bool(false)) {
                    errors.push(ValidationError::new(
                        path,
                        format!("additional property not allowed: {key}"),
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text_schema() -> Value {
        json!({
            "type": "object",
            "properties": { "text": { "type": "string" } },
            "required": ["text"],
            "additionalProperties": false
        })
    }

    #[test]
    fn accepts_matching_arguments() {
        assert!(validate(&text_schema(), &json!({"text": "hello"})).is_ok());
    }

    #[test]
    fn reports_missing_required_field() {
        let errors = validate(&text_schema(), &json!({})).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "root: missing required field: text");
    }

    #[test]
    fn reports_wrong_property_type() {
        let errors = validate(&text_schema(), &json!({"text": 5})).unwrap_err();
        assert_eq!(errors[0].path, "root.text");
        assert!(errors[0].message.contains("expected type string, got integer"));
    }

    #[test]
    fn rejects_unknown_property() {
        let errors = validate(&text_schema(), &json!({"text": "a", "extra": 1})).unwrap_err();
        assert!(errors[0].message.contains("extra"));
    }

    #[test]
    fn integer_rejects_floats() {
        let schema = json!({"type": "integer"});
        assert!(validate(&schema, &json!(2)).is_ok());
        assert!(validate(&schema, &json!(2.5)).is_err());
    }

    #[test]
    fn enum_constraint() {
        let schema = json!({"enum": ["text", "json"]});
        assert!(validate(&schema, &json!("json")).is_ok());
        assert!(validate(&schema, &json!("yaml")).is_err());
    }
}
