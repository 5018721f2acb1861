use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::Id;

/// A named grouping that points at the configuration documents overriding
/// the defaults for its surveys. `override_configs` is ordered: later
/// entries win when resolution merges their values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    /// Unique, required; the natural key. There is no update path.
    pub name: String,
    #[serde(default)]
    pub override_configs: Vec<Id>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new tag
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTag {
    pub name: String,
    #[serde(default)]
    pub override_configs: Vec<Id>,
}

impl NewTag {
    pub fn into_tag(self) -> Tag {
        let now = Utc::now();
        Tag {
            name: self.name,
            override_configs: self.override_configs,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Exact-match filter for tag listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TagFilter {
    pub name: Option<String>,
}

impl TagFilter {
    pub fn matches(&self, tag: &Tag) -> bool {
        match &self.name {
            Some(name) => tag.name == *name,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_wire_format_uses_override_configs() {
        let tag = NewTag {
            name: "checkout".to_string(),
            override_configs: vec!["cfg-1".to_string(), "cfg-2".to_string()],
        }
        .into_tag();

        let json = serde_json::to_string(&tag).unwrap();
        assert!(json.contains("\"overrideConfigs\":[\"cfg-1\",\"cfg-2\"]"));
    }

    #[test]
    fn test_new_tag_defaults_to_no_overrides() {
        let parsed: NewTag = serde_json::from_str(r#"{"name": "plain"}"#).unwrap();
        assert!(parsed.override_configs.is_empty());

        let tag = parsed.into_tag();
        assert_eq!(tag.name, "plain");
        assert!(tag.override_configs.is_empty());
    }

    #[test]
    fn test_filter_matches_name_exactly() {
        let tag = NewTag {
            name: "checkout".to_string(),
            override_configs: Vec::new(),
        }
        .into_tag();

        assert!(TagFilter { name: None }.matches(&tag));
        assert!(TagFilter {
            name: Some("checkout".to_string())
        }
        .matches(&tag));
        assert!(!TagFilter {
            name: Some("check".to_string())
        }
        .matches(&tag));
    }
}
