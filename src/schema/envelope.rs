//! Record extraction from JSON response bodies.
//!
//! APIs either return a bare array of records or wrap it in an envelope
//! object such as `{"data": [...]}`. A configured envelope path wins;
//! otherwise a fixed list of well-known keys is probed.

use crate::core::{ApiError, Result};
use log::warn;
use serde_json::{Map, Value as JsonValue};

/// Envelope keys probed when no explicit path is configured.
pub const WELL_KNOWN_KEYS: [&str; 4] = ["data", "results", "items", "records"];

/// Locate the record array in a response body and return its object
/// elements. Non-object elements are skipped.
pub fn extract_records(
    body: &JsonValue,
    envelope: Option<&str>,
) -> Result<Vec<Map<String, JsonValue>>> {
    let array = match body {
        JsonValue::Array(items) => items.as_slice(),
        JsonValue::Object(_) => match envelope {
            Some(path) => resolve_path(body, path)?,
            None => probe_well_known(body)?,
        },
        other => {
            return Err(ApiError::Schema(format!(
                "expected a JSON array or envelope object, got {}",
                json_kind(other)
            )));
        }
    };

    let mut records = Vec::with_capacity(array.len());
    for item in array {
        match item {
            JsonValue::Object(map) => records.push(map.clone()),
            other => warn!("skipping non-object record of type {}", json_kind(other)),
        }
    }
    Ok(records)
}

/// Walk a dot-separated envelope path down to the record array.
fn resolve_path<'a>(body: &'a JsonValue, path: &str) -> Result<&'a [JsonValue]> {
    let mut current = body;
    for segment in path.split('.') {
        current = current.get(segment).ok_or_else(|| {
            ApiError::Schema(format!("envelope path '{}' not found in response", path))
        })?;
    }

    current.as_array().map(Vec::as_slice).ok_or_else(|| {
        ApiError::Schema(format!(
            "envelope path '{}' points at {}, expected an array",
            path,
            json_kind(current)
        ))
    })
}

fn probe_well_known(body: &JsonValue) -> Result<&[JsonValue]> {
    for key in WELL_KNOWN_KEYS {
        if let Some(JsonValue::Array(items)) = body.get(key) {
            return Ok(items);
        }
    }

    Err(ApiError::Schema(
        "response object contains no record array under a known envelope key".into(),
    ))
}

fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "a boolean",
        JsonValue::Number(_) => "a number",
        JsonValue::String(_) => "a string",
        JsonValue::Array(_) => "an array",
        JsonValue::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_root_array() {
        let body = json!([{"id": 1}, {"id": 2}]);
        let records = extract_records(&body, None).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_configured_envelope() {
        let body = json!({"data": [{"id": 1}]});
        let records = extract_records(&body, Some("data")).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_nested_envelope_path() {
        let body = json!({"meta": {}, "payload": {"rows": [{"id": 1}, {"id": 2}]}});
        let records = extract_records(&body, Some("payload.rows")).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_well_known_key_probe() {
        let body = json!({"count": 2, "results": [{"id": 1}, {"id": 2}]});
        let records = extract_records(&body, None).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_missing_envelope_path_fails() {
        let body = json!({"data": [{"id": 1}]});
        let err = extract_records(&body, Some("rows")).unwrap_err();
        assert!(matches!(err, ApiError::Schema(_)));
    }

    #[test]
    fn test_envelope_pointing_at_scalar_fails() {
        let body = json!({"data": 42});
        let err = extract_records(&body, Some("data")).unwrap_err();
        assert!(matches!(err, ApiError::Schema(_)));
    }

    #[test]
    fn test_scalar_root_fails() {
        let err = extract_records(&json!(17), None).unwrap_err();
        assert!(matches!(err, ApiError::Schema(_)));
    }

    #[test]
    fn test_object_without_known_keys_fails() {
        let body = json!({"id": 1, "name": "a"});
        let err = extract_records(&body, None).unwrap_err();
        assert!(matches!(err, ApiError::Schema(_)));
    }

    #[test]
    fn test_non_object_elements_skipped() {
        let body = json!([{"id": 1}, 7, "x", {"id": 2}]);
        let records = extract_records(&body, None).unwrap();
        assert_eq!(records.len(), 2);
    }
}
