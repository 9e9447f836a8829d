//! Request parameter checks and query-string encoding.

use serde_json::{Map, Value};

use crate::error::{IntercomError, Result};

/// Keys that identify a user in lookup calls.
const USER_IDENTITY_KEYS: [&str; 3] = ["email", "user_id", "id"];

/// Name used in "Expected params Hash" errors for a non-object value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Hash",
    }
}

/// `params` as a JSON object, or an `Argument` error naming its type.
pub fn expect_object(params: &Value) -> Result<&Map<String, Value>> {
    params.as_object().ok_or_else(|| {
        IntercomError::Argument(format!("Expected params Hash, got {}", type_name(params)))
    })
}

/// Ensure `params` is an object carrying `email`, `user_id` or `id`.
pub fn check_required_params(params: &Value) -> Result<()> {
    let map = expect_object(params)?;
    if USER_IDENTITY_KEYS.iter().any(|key| map.contains_key(*key)) {
        Ok(())
    } else {
        Err(IntercomError::Argument(
            "Either email or user_id must be specified".to_string(),
        ))
    }
}

/// Form-encode an object's entries. `null` values are skipped; arrays and
/// objects are sent as their JSON text.
pub fn query_string(params: &Map<String, Value>) -> String {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in params {
        match value {
            Value::Null => {}
            Value::String(s) => {
                serializer.append_pair(key, s);
            }
            other => {
                serializer.append_pair(key, &other.to_string());
            }
        }
    }
    serializer.finish()
}
