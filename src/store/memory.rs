use std::collections::HashMap;

use anyhow::Result;
use parking_lot::RwLock;

use crate::logic::apply_config_update;
use crate::model::{
    ConcludeSurvey, ConfigFilter, ConfigUpdate, Configuration, Id, Survey, SurveyFilter, Tag,
    TagFilter,
};
use crate::store::traits::{ConcludedSurvey, ConfigStore, Store, SurveyStore, TagStore};

/// In-memory document store. The default backend when no database is
/// configured; also what the test suites run against. Each mutating
/// operation holds the collection's write lock for its full
/// read-modify-write, so updates and conclusions are atomic.
#[derive(Debug, Default)]
pub struct MemoryStore {
    configs: RwLock<HashMap<Id, Configuration>>,
    tags: RwLock<HashMap<String, Tag>>,
    surveys: RwLock<HashMap<Id, Survey>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl ConfigStore for MemoryStore {
    async fn get_config(&self, id: &Id) -> Result<Option<Configuration>> {
        Ok(self.configs.read().get(id).cloned())
    }

    async fn list_configs(&self, filter: &ConfigFilter) -> Result<Vec<Configuration>> {
        let mut configs: Vec<Configuration> = self
            .configs
            .read()
            .values()
            .filter(|config| filter.matches(config))
            .cloned()
            .collect();
        configs.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(configs)
    }

    async fn insert_config(&self, config: Configuration) -> Result<()> {
        self.configs.write().insert(config.id.clone(), config);
        Ok(())
    }

    async fn update_config(
        &self,
        id: &Id,
        update: &ConfigUpdate,
    ) -> Result<Option<Configuration>> {
        let mut configs = self.configs.write();
        let Some(config) = configs.get_mut(id) else {
            return Ok(None);
        };
        apply_config_update(config, update);
        Ok(Some(config.clone()))
    }
}

#[async_trait::async_trait]
impl TagStore for MemoryStore {
    async fn get_tag(&self, name: &str) -> Result<Option<Tag>> {
        Ok(self.tags.read().get(name).cloned())
    }

    async fn list_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>> {
        let mut tags: Vec<Tag> = self
            .tags
            .read()
            .values()
            .filter(|tag| filter.matches(tag))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.name.cmp(&b.name)));
        Ok(tags)
    }

    async fn insert_tag(&self, tag: Tag) -> Result<Option<Tag>> {
        let mut tags = self.tags.write();
        if tags.contains_key(&tag.name) {
            return Ok(None);
        }
        tags.insert(tag.name.clone(), tag.clone());
        Ok(Some(tag))
    }
}

#[async_trait::async_trait]
impl SurveyStore for MemoryStore {
    async fn get_survey(&self, id: &Id) -> Result<Option<Survey>> {
        Ok(self.surveys.read().get(id).cloned())
    }

    async fn list_surveys(&self, filter: &SurveyFilter) -> Result<Vec<Survey>> {
        let mut surveys: Vec<Survey> = self
            .surveys
            .read()
            .values()
            .filter(|survey| filter.matches(survey))
            .cloned()
            .collect();
        surveys.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(surveys)
    }

    async fn insert_survey(&self, survey: Survey) -> Result<()> {
        self.surveys.write().insert(survey.id.clone(), survey);
        Ok(())
    }

    async fn conclude_survey(&self, conclusion: ConcludeSurvey) -> Result<Option<ConcludedSurvey>> {
        let mut surveys = self.surveys.write();
        let Some(survey) = surveys.get_mut(&conclusion.survey_id) else {
            return Ok(None);
        };
        if survey.concluded {
            return Ok(Some(ConcludedSurvey::AlreadyConcluded(survey.clone())));
        }
        survey.note = conclusion.note;
        survey.comment = conclusion.comment;
        survey.concluded = true;
        survey.updated_at = chrono::Utc::now();
        Ok(Some(ConcludedSurvey::Concluded(survey.clone())))
    }
}

impl Store for MemoryStore {}
