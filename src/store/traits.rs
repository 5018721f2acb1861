use anyhow::Result;

use crate::model::{
    ConcludeSurvey, ConfigFilter, ConfigUpdate, Configuration, Id, Survey, SurveyFilter, Tag,
    TagFilter,
};

#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get_config(&self, id: &Id) -> Result<Option<Configuration>>;
    async fn list_configs(&self, filter: &ConfigFilter) -> Result<Vec<Configuration>>;
    async fn insert_config(&self, config: Configuration) -> Result<()>;
    /// Apply an already-validated partial update atomically: alias
    /// replaced, values deep-merged, all inside the store's own
    /// consistency boundary. Returns the updated document, or `None`
    /// when no document carries the id.
    async fn update_config(&self, id: &Id, update: &ConfigUpdate)
        -> Result<Option<Configuration>>;
}

#[async_trait::async_trait]
pub trait TagStore: Send + Sync {
    async fn get_tag(&self, name: &str) -> Result<Option<Tag>>;
    async fn list_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>>;
    /// Insert a tag, enforcing name uniqueness. Returns the created tag,
    /// or `None` when the name is already taken.
    async fn insert_tag(&self, tag: Tag) -> Result<Option<Tag>>;
}

/// Outcome of a conclusion attempt against an existing survey.
#[derive(Debug, Clone, PartialEq)]
pub enum ConcludedSurvey {
    /// The submission was stored and the survey is now concluded
    Concluded(Survey),
    /// The survey had already been concluded; nothing was changed
    AlreadyConcluded(Survey),
}

#[async_trait::async_trait]
pub trait SurveyStore: Send + Sync {
    async fn get_survey(&self, id: &Id) -> Result<Option<Survey>>;
    async fn list_surveys(&self, filter: &SurveyFilter) -> Result<Vec<Survey>>;
    async fn insert_survey(&self, survey: Survey) -> Result<()>;
    /// Store the form submission and flip `concluded`, atomically.
    /// `Ok(None)` when the survey does not exist.
    async fn conclude_survey(&self, conclusion: ConcludeSurvey) -> Result<Option<ConcludedSurvey>>;
}

pub trait Store: ConfigStore + TagStore + SurveyStore + Send + Sync {}
