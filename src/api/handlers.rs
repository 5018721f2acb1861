use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Serialize;

use crate::api::auth::{AuthContext, Role};
use crate::api::error::ApiError;
use crate::logic::{parse_config_update, resolve_tag_values};
use crate::model::{
    ConcludeSurvey, ConfigFilter, Configuration, NewConfig, NewSurvey, NewTag, Survey,
    SurveyFilter, Tag, TagFilter, ValueMap,
};
use crate::store::{ConcludedSurvey, Store};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct ConfigListResponse {
    pub configs: Vec<Configuration>,
}

#[derive(Debug, Serialize)]
pub struct TagListResponse {
    pub tags: Vec<Tag>,
}

#[derive(Debug, Serialize)]
pub struct SurveyListResponse {
    pub surveys: Vec<Survey>,
}

#[derive(Debug, Serialize)]
pub struct ConcludeResponse {
    pub ok: bool,
}

/// Payload handed to the survey widget: the survey itself plus the
/// merged configuration values resolved from its tag.
#[derive(Debug, Serialize)]
pub struct SurveyDeliveryResponse {
    pub survey: Survey,
    pub values: ValueMap,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    })
}

// ============ Configuration handlers ============

pub async fn list_configs<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Query(filter): Query<ConfigFilter>,
) -> Result<Json<ConfigListResponse>, ApiError> {
    auth.require(Role::ConfigRead)?;
    let configs = store.list_configs(&filter).await?;
    Ok(Json(ConfigListResponse { configs }))
}

pub async fn create_config<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Json(payload): Json<NewConfig>,
) -> Result<Json<Configuration>, ApiError> {
    auth.require(Role::ConfigWrite)?;
    let config = payload.into_config();
    store.insert_config(config.clone()).await?;
    log::info!("created config {}", config.id);
    Ok(Json(config))
}

pub async fn get_config<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<Configuration>, ApiError> {
    auth.require(Role::ConfigRead)?;
    let config = store
        .get_config(&id)
        .await?
        .ok_or(ApiError::NotFound("Config"))?;
    Ok(Json(config))
}

/// Patch a configuration. The payload may only carry `alias` and
/// `values`; anything else rejects the request before the store is
/// touched. Values are deep-merged into the stored document.
pub async fn update_config<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Path(id): Path<String>,
    Json(payload): Json<ValueMap>,
) -> Result<Json<Configuration>, ApiError> {
    auth.require(Role::ConfigWrite)?;
    let update = parse_config_update(&payload)?;
    let config = store
        .update_config(&id, &update)
        .await?
        .ok_or(ApiError::NotFound("Config"))?;
    log::info!("updated config {}", config.id);
    Ok(Json(config))
}

// ============ Tag handlers ============

pub async fn list_tags<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Query(filter): Query<TagFilter>,
) -> Result<Json<TagListResponse>, ApiError> {
    auth.require(Role::TagRead)?;
    let tags = store.list_tags(&filter).await?;
    Ok(Json(TagListResponse { tags }))
}

pub async fn create_tag<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Json(payload): Json<NewTag>,
) -> Result<Json<Tag>, ApiError> {
    auth.require(Role::TagWrite)?;
    for config_id in &payload.override_configs {
        if store.get_config(config_id).await?.is_none() {
            return Err(ApiError::Validation(format!(
                "Unknown override config: <{}>",
                config_id
            )));
        }
    }

    let tag = payload.into_tag();
    let inserted = store.insert_tag(tag).await?.ok_or_else(|| {
        ApiError::Conflict("Tag already exists".to_string())
    })?;
    log::info!("created tag {}", inserted.name);
    Ok(Json(inserted))
}

pub async fn get_tag<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Path(name): Path<String>,
) -> Result<Json<Tag>, ApiError> {
    auth.require(Role::TagRead)?;
    let tag = store
        .get_tag(&name)
        .await?
        .ok_or(ApiError::NotFound("Tag"))?;
    Ok(Json(tag))
}

// ============ Survey handlers ============

pub async fn list_surveys<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Query(filter): Query<SurveyFilter>,
) -> Result<Json<SurveyListResponse>, ApiError> {
    auth.require(Role::SurveyRead)?;
    let surveys = store.list_surveys(&filter).await?;
    Ok(Json(SurveyListResponse { surveys }))
}

pub async fn create_survey<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Json(payload): Json<NewSurvey>,
) -> Result<Json<Survey>, ApiError> {
    auth.require(Role::SurveyWrite)?;
    if let Some(tag_name) = &payload.tag {
        if store.get_tag(tag_name).await?.is_none() {
            return Err(ApiError::Validation(format!(
                "Unknown tag: <{}>",
                tag_name
            )));
        }
    }

    let survey = payload.into_survey();
    store.insert_survey(survey.clone()).await?;
    log::info!("created survey {} for {}", survey.id, survey.target);
    Ok(Json(survey))
}

pub async fn get_survey<S: Store>(
    State(store): State<Arc<S>>,
    auth: AuthContext,
    Path(id): Path<String>,
) -> Result<Json<Survey>, ApiError> {
    auth.require(Role::SurveyRead)?;
    let survey = store
        .get_survey(&id)
        .await?
        .ok_or(ApiError::NotFound("Survey"))?;
    Ok(Json(survey))
}

/// Public endpoint the embedded widget calls. Concluded surveys are
/// indistinguishable from missing ones so a respondent cannot reopen
/// or probe them.
pub async fn deliver_survey<S: Store>(
    State(store): State<Arc<S>>,
    Path(id): Path<String>,
) -> Result<Json<SurveyDeliveryResponse>, ApiError> {
    let survey = store
        .get_survey(&id)
        .await?
        .filter(|s| !s.concluded)
        .ok_or(ApiError::NotFound("Survey"))?;

    let values = match &survey.tag {
        Some(tag_name) => match resolve_tag_values(store.as_ref(), tag_name).await? {
            Some(values) => values,
            None => {
                log::warn!("survey {} references unknown tag {}", survey.id, tag_name);
                ValueMap::new()
            }
        },
        None => ValueMap::new(),
    };

    Ok(Json(SurveyDeliveryResponse { survey, values }))
}

/// Public endpoint: records the respondent's note and comment. A
/// survey can only be concluded once; repeat submissions answer
/// `{"ok": false}` without overwriting the stored response.
pub async fn conclude_survey<S: Store>(
    State(store): State<Arc<S>>,
    Json(payload): Json<ConcludeSurvey>,
) -> Result<Json<ConcludeResponse>, ApiError> {
    let note = match payload.note {
        Some(note) if (0..=10).contains(&note) => note,
        _ => {
            return Err(ApiError::Validation(
                "Note must be between 0 and 10".to_string(),
            ))
        }
    };

    let outcome = store
        .conclude_survey(payload)
        .await?
        .ok_or(ApiError::NotFound("Survey"))?;

    let ok = match outcome {
        ConcludedSurvey::Concluded(survey) => {
            log::info!("survey {} concluded with note {}", survey.id, note);
            true
        }
        ConcludedSurvey::AlreadyConcluded(survey) => {
            log::warn!("survey {} was already concluded", survey.id);
            false
        }
    };

    Ok(Json(ConcludeResponse { ok }))
}
