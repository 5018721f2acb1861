use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::logic::apply_config_update;
use crate::model::{
    ConcludeSurvey, ConfigFilter, ConfigUpdate, Configuration, Id, Survey, SurveyFilter, Tag,
    TagFilter, ValueMap,
};
use crate::store::traits::{ConcludedSurvey, ConfigStore, Store, SurveyStore, TagStore};

/// PostgreSQL-backed document store. Documents keep their nested payloads
/// in JSONB columns; partial updates run inside a `SELECT ... FOR UPDATE`
/// transaction so two concurrent merges against the same document cannot
/// lose writes.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new PostgreSQL store with the given database URL
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(20)
            .connect(database_url)
            .await
            .context("Failed to create PostgreSQL connection pool")?;

        Ok(Self { pool })
    }

    /// Create the document tables if they do not exist yet. DDL is issued
    /// at runtime so builds never need a reachable database.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS configs (
                id TEXT PRIMARY KEY,
                "key" TEXT,
                alias TEXT,
                "values" JSONB NOT NULL DEFAULT '{}'::jsonb,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create configs table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tags (
                name TEXT PRIMARY KEY,
                override_configs JSONB NOT NULL DEFAULT '[]'::jsonb,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create tags table")?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS surveys (
                id TEXT PRIMARY KEY,
                reviewer TEXT NOT NULL,
                target TEXT NOT NULL,
                tag TEXT,
                note INTEGER,
                comment TEXT,
                concluded BOOLEAN NOT NULL DEFAULT FALSE,
                created_at TIMESTAMPTZ NOT NULL,
                updated_at TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .context("Failed to create surveys table")?;

        Ok(())
    }

    /// Get a reference to the connection pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn config_from_row(row: &PgRow) -> Configuration {
    let values: Json<ValueMap> = row.get("values");
    Configuration {
        id: row.get("id"),
        key: row.get("key"),
        alias: row.get("alias"),
        values: values.0,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

fn tag_from_row(row: &PgRow) -> Tag {
    let override_configs: Json<Vec<Id>> = row.get("override_configs");
    Tag {
        name: row.get("name"),
        override_configs: override_configs.0,
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

fn survey_from_row(row: &PgRow) -> Survey {
    Survey {
        id: row.get("id"),
        reviewer: row.get("reviewer"),
        target: row.get("target"),
        tag: row.get("tag"),
        note: row.get("note"),
        comment: row.get("comment"),
        concluded: row.get("concluded"),
        created_at: row.get::<DateTime<Utc>, _>("created_at"),
        updated_at: row.get::<DateTime<Utc>, _>("updated_at"),
    }
}

#[async_trait::async_trait]
impl ConfigStore for PostgresStore {
    async fn get_config(&self, id: &Id) -> Result<Option<Configuration>> {
        let row = sqlx::query(
            r#"SELECT id, "key", alias, "values", created_at, updated_at FROM configs WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch config")?;

        Ok(row.as_ref().map(config_from_row))
    }

    async fn list_configs(&self, filter: &ConfigFilter) -> Result<Vec<Configuration>> {
        let rows = sqlx::query(
            r#"
            SELECT id, "key", alias, "values", created_at, updated_at FROM configs
            WHERE ($1::text IS NULL OR "key" = $1) AND ($2::text IS NULL OR alias = $2)
            ORDER BY created_at, id
            "#,
        )
        .bind(&filter.key)
        .bind(&filter.alias)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list configs")?;

        Ok(rows.iter().map(config_from_row).collect())
    }

    async fn insert_config(&self, config: Configuration) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO configs (id, "key", alias, "values", created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(&config.id)
        .bind(&config.key)
        .bind(&config.alias)
        .bind(Json(&config.values))
        .bind(config.created_at)
        .bind(config.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert config")?;

        Ok(())
    }

    async fn update_config(
        &self,
        id: &Id,
        update: &ConfigUpdate,
    ) -> Result<Option<Configuration>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin config update transaction")?;

        let row = sqlx::query(
            r#"SELECT id, "key", alias, "values", created_at, updated_at FROM configs WHERE id = $1 FOR UPDATE"#,
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch config for update")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut config = config_from_row(&row);
        apply_config_update(&mut config, update);

        sqlx::query(r#"UPDATE configs SET alias = $2, "values" = $3, updated_at = $4 WHERE id = $1"#)
            .bind(&config.id)
            .bind(&config.alias)
            .bind(Json(&config.values))
            .bind(config.updated_at)
            .execute(&mut *tx)
            .await
            .context("Failed to persist config update")?;

        tx.commit()
            .await
            .context("Failed to commit config update")?;

        Ok(Some(config))
    }
}

#[async_trait::async_trait]
impl TagStore for PostgresStore {
    async fn get_tag(&self, name: &str) -> Result<Option<Tag>> {
        let row = sqlx::query(
            "SELECT name, override_configs, created_at, updated_at FROM tags WHERE name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch tag")?;

        Ok(row.as_ref().map(tag_from_row))
    }

    async fn list_tags(&self, filter: &TagFilter) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT name, override_configs, created_at, updated_at FROM tags
            WHERE ($1::text IS NULL OR name = $1)
            ORDER BY created_at, name
            "#,
        )
        .bind(&filter.name)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list tags")?;

        Ok(rows.iter().map(tag_from_row).collect())
    }

    async fn insert_tag(&self, tag: Tag) -> Result<Option<Tag>> {
        let result = sqlx::query(
            r#"
            INSERT INTO tags (name, override_configs, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO NOTHING
            "#,
        )
        .bind(&tag.name)
        .bind(Json(&tag.override_configs))
        .bind(tag.created_at)
        .bind(tag.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert tag")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        Ok(Some(tag))
    }
}

#[async_trait::async_trait]
impl SurveyStore for PostgresStore {
    async fn get_survey(&self, id: &Id) -> Result<Option<Survey>> {
        let row = sqlx::query(
            "SELECT id, reviewer, target, tag, note, comment, concluded, created_at, updated_at FROM surveys WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch survey")?;

        Ok(row.as_ref().map(survey_from_row))
    }

    async fn list_surveys(&self, filter: &SurveyFilter) -> Result<Vec<Survey>> {
        let rows = sqlx::query(
            r#"
            SELECT id, reviewer, target, tag, note, comment, concluded, created_at, updated_at FROM surveys
            WHERE ($1::boolean IS NULL OR concluded = $1) AND ($2::text IS NULL OR tag = $2)
            ORDER BY created_at, id
            "#,
        )
        .bind(filter.concluded)
        .bind(&filter.tag)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list surveys")?;

        Ok(rows.iter().map(survey_from_row).collect())
    }

    async fn insert_survey(&self, survey: Survey) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO surveys (id, reviewer, target, tag, note, comment, concluded, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(&survey.id)
        .bind(&survey.reviewer)
        .bind(&survey.target)
        .bind(&survey.tag)
        .bind(survey.note)
        .bind(&survey.comment)
        .bind(survey.concluded)
        .bind(survey.created_at)
        .bind(survey.updated_at)
        .execute(&self.pool)
        .await
        .context("Failed to insert survey")?;

        Ok(())
    }

    async fn conclude_survey(&self, conclusion: ConcludeSurvey) -> Result<Option<ConcludedSurvey>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .context("Failed to begin conclusion transaction")?;

        let row = sqlx::query(
            "SELECT id, reviewer, target, tag, note, comment, concluded, created_at, updated_at FROM surveys WHERE id = $1 FOR UPDATE",
        )
        .bind(&conclusion.survey_id)
        .fetch_optional(&mut *tx)
        .await
        .context("Failed to fetch survey for conclusion")?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut survey = survey_from_row(&row);
        if survey.concluded {
            return Ok(Some(ConcludedSurvey::AlreadyConcluded(survey)));
        }

        survey.note = conclusion.note;
        survey.comment = conclusion.comment;
        survey.concluded = true;
        survey.updated_at = Utc::now();

        sqlx::query(
            "UPDATE surveys SET note = $2, comment = $3, concluded = TRUE, updated_at = $4 WHERE id = $1",
        )
        .bind(&survey.id)
        .bind(survey.note)
        .bind(&survey.comment)
        .bind(survey.updated_at)
        .execute(&mut *tx)
        .await
        .context("Failed to persist conclusion")?;

        tx.commit()
            .await
            .context("Failed to commit conclusion")?;

        Ok(Some(ConcludedSurvey::Concluded(survey)))
    }
}

impl Store for PostgresStore {}
