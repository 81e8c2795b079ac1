//! Wire encoding for values and objects
//!
//! Values and objects travel as JSON strings. An object is stored whole as
//! the single hash field [`OBJECT_FIELD`]; the hash is only a container.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Completion;
use crate::JsonObject;

/// Hash field holding a serialized object.
pub const OBJECT_FIELD: &str = "newData";

/// Returns true for values that are not written at all (`null` and `""`).
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

pub fn encode_value(value: &Value) -> Completion<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a stored value. A missing or empty payload decodes to `None`.
pub fn decode_value(raw: Option<String>) -> Completion<Option<Value>> {
    match raw {
        Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
        _ => Ok(None),
    }
}

/// Encodes an object into the hash fields to write.
pub fn encode_object(object: &JsonObject) -> Completion<Vec<(String, String)>> {
    let payload = serde_json::to_string(object)?;
    Ok(vec![(OBJECT_FIELD.to_string(), payload)])
}

/// Decodes an object from the fields of its hash.
///
/// A missing hash or missing field decodes to `None`; a payload that is not a
/// JSON object is a serialization error.
pub fn decode_object(mut fields: HashMap<String, String>) -> Completion<Option<JsonObject>> {
    match fields.remove(OBJECT_FIELD) {
        Some(raw) if !raw.is_empty() => Ok(Some(serde_json::from_str(&raw)?)),
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use serde_json::json;

    #[test]
    fn test_empty_values() {
        assert!(is_empty_value(&Value::Null));
        assert!(is_empty_value(&json!("")));
        assert!(!is_empty_value(&json!(0)));
        assert!(!is_empty_value(&json!(false)));
        assert!(!is_empty_value(&json!([])));
        assert!(!is_empty_value(&json!({})));
    }

    #[test]
    fn test_value_encoding() {
        assert_eq!(encode_value(&json!(100)).unwrap(), "100");
        assert_eq!(encode_value(&json!("hello")).unwrap(), "\"hello\"");
        assert_eq!(decode_value(Some("[1,2]".to_string())).unwrap(), Some(json!([1, 2])));
    }

    #[test]
    fn test_absent_value_decodes_to_none() {
        assert_eq!(decode_value(None).unwrap(), None);
        assert_eq!(decode_value(Some(String::new())).unwrap(), None);
    }

    #[test]
    fn test_malformed_value_is_serialization_error() {
        let result = decode_value(Some("{oops".to_string()));
        assert!(matches!(result, Err(CacheError::Serialization(_))));
    }

    #[test]
    fn test_object_uses_single_field() {
        let object = json!({"name": "a", "age": 1}).as_object().cloned().unwrap();

        let fields = encode_object(&object).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].0, OBJECT_FIELD);

        let decoded = decode_object(fields.into_iter().collect()).unwrap();
        assert_eq!(decoded, Some(object));
    }

    #[test]
    fn test_missing_object_decodes_to_none() {
        assert_eq!(decode_object(HashMap::new()).unwrap(), None);

        let unrelated = HashMap::from([("other".to_string(), "{}".to_string())]);
        assert_eq!(decode_object(unrelated).unwrap(), None);
    }

    #[test]
    fn test_non_object_payload_is_serialization_error() {
        let fields = HashMap::from([(OBJECT_FIELD.to_string(), "[1,2,3]".to_string())]);
        assert!(matches!(
            decode_object(fields),
            Err(CacheError::Serialization(_))
        ));
    }
}
