use chrono::Utc;
use serde_json::Value;

use crate::model::{ConfigUpdate, Configuration, ValueMap};

/// Recursively merge `incoming` into `existing`.
///
/// Nested objects are combined key-by-key; any other pairing (scalar over
/// scalar, scalar over object, object over scalar, arrays) replaces the
/// existing value. Keys present only in `existing` are left untouched.
pub fn merge_values(existing: &mut ValueMap, incoming: &ValueMap) {
    for (key, incoming_value) in incoming {
        match (existing.get_mut(key), incoming_value) {
            (Some(Value::Object(current)), Value::Object(patch)) => {
                merge_values(current, patch);
            }
            (_, value) => {
                existing.insert(key.clone(), value.clone());
            }
        }
    }
}

/// Apply a validated partial update to a configuration document: the
/// alias is replaced, `values` is deep-merged, `updated_at` refreshed.
/// Stores call this inside their own atomicity boundary (write lock or
/// row-locking transaction) so concurrent updates cannot lose writes.
pub fn apply_config_update(config: &mut Configuration, update: &ConfigUpdate) {
    if let Some(alias) = &update.alias {
        config.alias = Some(alias.clone());
    }
    if let Some(values) = &update.values {
        merge_values(&mut config.values, values);
    }
    config.updated_at = Utc::now();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewConfig;

    fn map(json: &str) -> ValueMap {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_merge_preserves_untouched_keys() {
        let mut existing = map(r#"{"y": 2}"#);
        merge_values(&mut existing, &map(r#"{"x": 1}"#));
        assert_eq!(existing, map(r#"{"y": 2, "x": 1}"#));
    }

    #[test]
    fn test_merge_recurses_into_nested_objects() {
        let mut existing = map(r#"{"theme": {"color": "blue", "size": 12}, "other": true}"#);
        merge_values(&mut existing, &map(r#"{"theme": {"color": "red"}}"#));
        assert_eq!(
            existing,
            map(r#"{"theme": {"color": "red", "size": 12}, "other": true}"#)
        );
    }

    #[test]
    fn test_merge_replaces_scalar_leaves() {
        let mut existing = map(r#"{"a": 1, "b": "keep"}"#);
        merge_values(&mut existing, &map(r#"{"a": 2}"#));
        assert_eq!(existing, map(r#"{"a": 2, "b": "keep"}"#));
    }

    #[test]
    fn test_merge_replaces_across_shapes() {
        // A scalar may replace an object, an object may replace a scalar
        let mut existing = map(r#"{"a": {"deep": true}, "b": 1}"#);
        merge_values(&mut existing, &map(r#"{"a": 5, "b": {"deep": false}}"#));
        assert_eq!(existing, map(r#"{"a": 5, "b": {"deep": false}}"#));
    }

    #[test]
    fn test_merge_replaces_arrays_wholesale() {
        let mut existing = map(r#"{"steps": [1, 2, 3]}"#);
        merge_values(&mut existing, &map(r#"{"steps": [4]}"#));
        assert_eq!(existing, map(r#"{"steps": [4]}"#));
    }

    #[test]
    fn test_merge_is_idempotent() {
        let patch = map(r#"{"theme": {"color": "red"}, "flag": true}"#);
        let mut once = map(r#"{"theme": {"color": "blue", "size": 12}}"#);
        merge_values(&mut once, &patch);
        let mut twice = once.clone();
        merge_values(&mut twice, &patch);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_apply_update_replaces_alias_and_merges_values() {
        let mut config = NewConfig {
            key: None,
            alias: Some("foo".to_string()),
            values: map(r#"{"y": 2}"#),
        }
        .into_config();
        let created_at = config.created_at;

        let update = ConfigUpdate {
            alias: Some("bar".to_string()),
            values: Some(map(r#"{"x": 1}"#)),
        };
        apply_config_update(&mut config, &update);

        assert_eq!(config.alias.as_deref(), Some("bar"));
        assert_eq!(config.values, map(r#"{"y": 2, "x": 1}"#));
        assert_eq!(config.created_at, created_at);
        assert!(config.updated_at >= created_at);
    }

    #[test]
    fn test_apply_update_with_absent_fields_changes_nothing_but_timestamp() {
        let mut config = NewConfig {
            key: Some("mui".to_string()),
            alias: Some("foo".to_string()),
            values: map(r#"{"y": 2}"#),
        }
        .into_config();

        apply_config_update(&mut config, &ConfigUpdate::default());

        assert_eq!(config.alias.as_deref(), Some("foo"));
        assert_eq!(config.values, map(r#"{"y": 2}"#));
    }
}
