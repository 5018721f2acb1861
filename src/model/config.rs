use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{generate_id, Id, ValueMap};

/// A named configuration document. `values` holds an arbitrary nested
/// JSON object (theme options, templates, feature switches) that survey
/// deliveries consume after override resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Unique identifier, assigned at creation and immutable afterwards
    pub id: Id,
    /// Optional classification label (e.g. "theme", "templates")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Optional human-readable name; replaceable through the update path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Nested payload; deep-merged (never replaced wholesale) on update
    #[serde(default)]
    pub values: ValueMap,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request to create a new configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    #[serde(default)]
    pub values: ValueMap,
}

impl NewConfig {
    pub fn into_config(self) -> Configuration {
        let now = Utc::now();
        Configuration {
            id: generate_id(),
            key: self.key,
            alias: self.alias,
            values: self.values,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Validated partial update for a configuration document.
/// Only `alias` and `values` are mutable; construction goes through
/// `logic::parse_config_update` which enforces the allow-list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigUpdate {
    /// Replaces the stored alias when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Deep-merged into the stored values when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<ValueMap>,
}

impl ConfigUpdate {
    pub fn is_empty(&self) -> bool {
        self.alias.is_none() && self.values.is_none()
    }
}

/// Exact-match filter for configuration listings
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigFilter {
    pub key: Option<String>,
    pub alias: Option<String>,
}

impl ConfigFilter {
    pub fn matches(&self, config: &Configuration) -> bool {
        if let Some(key) = &self.key {
            if config.key.as_deref() != Some(key.as_str()) {
                return false;
            }
        }
        if let Some(alias) = &self.alias {
            if config.alias.as_deref() != Some(alias.as_str()) {
                return false;
            }
        }
        true
    }
}
