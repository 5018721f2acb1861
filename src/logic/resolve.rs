use anyhow::Result;

use crate::logic::merge_values;
use crate::model::ValueMap;
use crate::store::traits::Store;

/// Resolve the effective configuration values for a tag by folding the
/// `values` of each referenced config through the deep merge, in
/// `override_configs` order. Later entries override earlier ones.
///
/// Returns `None` when the tag itself does not exist. A dangling config
/// reference is skipped; deliveries should not fail because an override
/// was deleted out from under its tag.
pub async fn resolve_tag_values<S: Store>(store: &S, tag_name: &str) -> Result<Option<ValueMap>> {
    let Some(tag) = store.get_tag(tag_name).await? else {
        return Ok(None);
    };

    let mut resolved = ValueMap::new();
    for config_id in &tag.override_configs {
        match store.get_config(config_id).await? {
            Some(config) => merge_values(&mut resolved, &config.values),
            None => log::warn!(
                "tag '{}' references missing config '{}'",
                tag_name,
                config_id
            ),
        }
    }

    Ok(Some(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{NewConfig, NewTag, ValueMap};
    use crate::store::memory::MemoryStore;
    use crate::store::traits::{ConfigStore, TagStore};

    fn map(json: &str) -> ValueMap {
        serde_json::from_str(json).unwrap()
    }

    async fn insert_config(store: &MemoryStore, key: &str, values: &str) -> String {
        let config = NewConfig {
            key: Some(key.to_string()),
            alias: None,
            values: map(values),
        }
        .into_config();
        let id = config.id.clone();
        store.insert_config(config).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_resolves_overrides_in_order() {
        let store = MemoryStore::new();
        let base = insert_config(
            &store,
            "theme",
            r#"{"theme": {"color": "blue", "size": 12}, "templates": {"CoreQuestionPhrase": "How likely?"}}"#,
        )
        .await;
        let brand = insert_config(&store, "theme", r#"{"theme": {"color": "red"}}"#).await;

        store
            .insert_tag(
                NewTag {
                    name: "checkout".to_string(),
                    override_configs: vec![base, brand],
                }
                .into_tag(),
            )
            .await
            .unwrap();

        let resolved = resolve_tag_values(&store, "checkout").await.unwrap().unwrap();
        assert_eq!(
            resolved,
            map(
                r#"{"theme": {"color": "red", "size": 12}, "templates": {"CoreQuestionPhrase": "How likely?"}}"#
            )
        );
    }

    #[tokio::test]
    async fn test_unknown_tag_resolves_to_none() {
        let store = MemoryStore::new();
        assert!(resolve_tag_values(&store, "missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dangling_config_reference_is_skipped() {
        let store = MemoryStore::new();
        let real = insert_config(&store, "theme", r#"{"a": 1}"#).await;

        store
            .insert_tag(
                NewTag {
                    name: "partial".to_string(),
                    override_configs: vec!["gone".to_string(), real],
                }
                .into_tag(),
            )
            .await
            .unwrap();

        let resolved = resolve_tag_values(&store, "partial").await.unwrap().unwrap();
        assert_eq!(resolved, map(r#"{"a": 1}"#));
    }

    #[tokio::test]
    async fn test_tag_without_overrides_resolves_empty() {
        let store = MemoryStore::new();
        store
            .insert_tag(
                NewTag {
                    name: "plain".to_string(),
                    override_configs: Vec::new(),
                }
                .into_tag(),
            )
            .await
            .unwrap();

        let resolved = resolve_tag_values(&store, "plain").await.unwrap().unwrap();
        assert!(resolved.is_empty());
    }
}
