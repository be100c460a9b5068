//! Serde helper functions for raw event deserialization.
//!
//! The activity log is produced by a front end that is not consistent about
//! identifier types: the same field may arrive as a JSON string in one file
//! and as a number in another.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
    Float(f64),
}

/// Deserialize an optional identifier that may be a string or a number.
///
/// Numbers are rendered with their canonical decimal form, strings are kept
/// verbatim (including the empty string logged for anonymous sessions).
pub fn deserialize_optional_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<StringOrNumber> = Option::deserialize(deserializer)?;
    Ok(value.map(|value| match value {
        StringOrNumber::String(s) => s,
        StringOrNumber::Integer(n) => n.to_string(),
        StringOrNumber::Float(n) => n.to_string(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestStruct {
        #[serde(default, deserialize_with = "deserialize_optional_string_or_number")]
        user_id: Option<String>,
    }

    #[test]
    fn test_string_is_kept_verbatim() {
        let json = r#"{"user_id": "39"}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.user_id, Some("39".to_string()));
    }

    #[test]
    fn test_empty_string_is_not_dropped() {
        let json = r#"{"user_id": ""}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.user_id, Some(String::new()));
    }

    #[test]
    fn test_integer_is_rendered() {
        let json = r#"{"user_id": 39}"#;
        let result: TestStruct = serde_json::from_str(json).unwrap();
        assert_eq!(result.user_id, Some("39".to_string()));
    }

    #[test]
    fn test_null_and_missing() {
        let result: TestStruct = serde_json::from_str(r#"{"user_id": null}"#).unwrap();
        assert_eq!(result.user_id, None);

        let result: TestStruct = serde_json::from_str("{}").unwrap();
        assert_eq!(result.user_id, None);
    }

    #[test]
    fn test_other_types_are_rejected() {
        let result: Result<TestStruct, _> = serde_json::from_str(r#"{"user_id": [1]}"#);
        assert!(result.is_err());
    }
}
