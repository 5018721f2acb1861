use serde_json::Value;
use thiserror::Error;

use crate::model::{ConfigUpdate, ValueMap};

/// Rejection raised while validating a configuration update payload.
/// The message format (angle brackets included) is part of the API
/// contract; clients match on it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UpdateRejection {
    #[error("Invalid field to change: <{0}>")]
    InvalidField(String),
}

/// Validate a raw update payload against the allow-list and produce the
/// typed update. Permitted field names are enumerated explicitly; the
/// first key falling outside the list (in payload order) rejects the
/// whole request, so a payload mixing valid and invalid fields applies
/// nothing. An explicit `null` for a permitted field is ignored.
pub fn parse_config_update(payload: &ValueMap) -> Result<ConfigUpdate, UpdateRejection> {
    let mut update = ConfigUpdate::default();

    for (field, value) in payload {
        match field.as_str() {
            "alias" => match value {
                Value::Null => {}
                Value::String(alias) => update.alias = Some(alias.clone()),
                _ => return Err(UpdateRejection::InvalidField(field.clone())),
            },
            "values" => match value {
                Value::Null => {}
                Value::Object(values) => update.values = Some(values.clone()),
                _ => return Err(UpdateRejection::InvalidField(field.clone())),
            },
            _ => return Err(UpdateRejection::InvalidField(field.clone())),
        }
    }

    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(json: &str) -> ValueMap {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_accepts_alias_and_values() {
        let update = parse_config_update(&map(r#"{"alias": "bar", "values": {"x": 1}}"#)).unwrap();
        assert_eq!(update.alias.as_deref(), Some("bar"));
        assert_eq!(update.values, Some(map(r#"{"x": 1}"#)));
    }

    #[test]
    fn test_accepts_partial_payloads() {
        let update = parse_config_update(&map(r#"{"values": {"x": 1}}"#)).unwrap();
        assert_eq!(update.alias, None);
        assert_eq!(update.values, Some(map(r#"{"x": 1}"#)));

        let update = parse_config_update(&map(r#"{}"#)).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_rejects_field_outside_allow_list() {
        let err = parse_config_update(&map(r#"{"key": "foo"}"#)).unwrap_err();
        assert_eq!(err, UpdateRejection::InvalidField("key".to_string()));
        assert_eq!(err.to_string(), "Invalid field to change: <key>");
    }

    #[test]
    fn test_rejects_whole_payload_even_with_valid_fields_present() {
        let err =
            parse_config_update(&map(r#"{"alias": "bar", "id": "nope", "values": {}}"#)).unwrap_err();
        assert_eq!(err, UpdateRejection::InvalidField("id".to_string()));
    }

    #[test]
    fn test_names_first_offending_field_in_payload_order() {
        let err = parse_config_update(&map(r#"{"zzz": 1, "aaa": 2}"#)).unwrap_err();
        assert_eq!(err, UpdateRejection::InvalidField("zzz".to_string()));
    }

    #[test]
    fn test_rejects_wrongly_shaped_permitted_fields() {
        let err = parse_config_update(&map(r#"{"alias": 42}"#)).unwrap_err();
        assert_eq!(err, UpdateRejection::InvalidField("alias".to_string()));

        let err = parse_config_update(&map(r#"{"values": [1, 2]}"#)).unwrap_err();
        assert_eq!(err, UpdateRejection::InvalidField("values".to_string()));
    }

    #[test]
    fn test_explicit_null_is_ignored() {
        let update = parse_config_update(&map(r#"{"alias": null, "values": null}"#)).unwrap();
        assert!(update.is_empty());
    }
}
