//! Hosted backend store
//!
//! Talks to a PostgREST-style REST API (`/rest/v1/<table>`) exposing the
//! `tutorials`, `categories` and `user_tutorials` tables. Row-level access is enforced
//! by the backend from the bearer token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{CatalogSource, PersistenceError, ProgressStore};
use crate::catalog::{Category, Difficulty, Tags, Tutorial};
use crate::progress::{ProgressRecord, ProgressStatus};

/// Row of the `tutorials` table
#[derive(Debug, Clone, Deserialize)]
struct TutorialRow {
    id: String,
    title: String,
    slug: String,
    description: String,
    content: String,
    video_url: Option<String>,
    category_id: Option<String>,
    difficulty: Option<Difficulty>,
    duration: Option<i64>,
    tags: Option<Vec<String>>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<TutorialRow> for Tutorial {
    fn from(row: TutorialRow) -> Self {
        let created_at = row.created_at.unwrap_or_default();
        Tutorial {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            content: row.content,
            video_url: row.video_url,
            category_id: row.category_id,
            difficulty: row.difficulty.unwrap_or_default(),
            duration: row.duration.and_then(|d| u32::try_from(d).ok()),
            tags: row.tags.map(Tags::from).unwrap_or_default(),
            created_at,
            updated_at: row.updated_at.unwrap_or(created_at),
        }
    }
}

/// Row of the `categories` table
#[derive(Debug, Clone, Deserialize)]
struct CategoryRow {
    id: String,
    name: String,
    slug: String,
    description: Option<String>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Category { id: row.id, name: row.name, slug: row.slug, description: row.description }
    }
}

/// Row of the `user_tutorials` table
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProgressRow {
    user_id: Option<String>,
    tutorial_id: Option<String>,
    status: Option<ProgressStatus>,
    progress: Option<i64>,
    started_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

impl ProgressRow {
    fn from_record(user_id: &str, record: &ProgressRecord) -> Self {
        Self {
            user_id: Some(user_id.to_string()),
            tutorial_id: Some(record.tutorial_id.clone()),
            status: Some(record.status),
            progress: Some(i64::from(record.progress)),
            started_at: Some(record.started_at),
            completed_at: record.completed_at,
        }
    }

    /// Convert to a record; rows without a tutorial are unusable
    fn into_record(self) -> Option<ProgressRecord> {
        let tutorial_id = self.tutorial_id?;
        let started_at = self.started_at.or(self.completed_at).unwrap_or_default();
        Some(ProgressRecord {
            tutorial_id,
            status: self.status.unwrap_or_default(),
            progress: self.progress.map_or(0, |p| p.clamp(0, 100) as u8),
            started_at,
            completed_at: self.completed_at,
        })
    }
}

/// Client for the hosted backend
pub struct RemoteStore {
    client: Client,
    /// Project URL, without trailing slash
    base_url: String,
    /// Public API key sent with every request
    api_key: String,
    /// User access token; the API key is used as bearer when absent
    access_token: Option<String>,
}

impl RemoteStore {
    /// Progress table name
    const PROGRESS_TABLE: &'static str = "user_tutorials";

    /// Create a client for the backend at `base_url`
    pub fn new(base_url: &str, api_key: impl Into<String>) -> Result<Self, PersistenceError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: None,
        })
    }

    /// Authenticate requests as a signed-in user
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, PersistenceError> {
        debug!(table, "Fetching rows");
        let request = self.client.get(self.table_url(table)).query(query);
        let response = check_status(self.authorized(request).send().await?).await?;

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Turn non-success responses into backend errors
async fn check_status(response: Response) -> Result<Response, PersistenceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), %message, "Backend request failed");
    Err(PersistenceError::Backend { status: status.as_u16(), message })
}

#[async_trait]
impl CatalogSource for RemoteStore {
    async fn list_tutorials(&self) -> Result<Vec<Tutorial>, PersistenceError> {
        let rows: Vec<TutorialRow> = self
            .get_rows(
                "tutorials",
                &[("select", "*".to_string()), ("order", "created_at.desc".to_string())],
            )
            .await?;
        Ok(rows.into_iter().map(Tutorial::from).collect())
    }

    async fn list_categories(&self) -> Result<Vec<Category>, PersistenceError> {
        let rows: Vec<CategoryRow> = self
            .get_rows("categories", &[("select", "*".to_string()), ("order", "name".to_string())])
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }
}

#[async_trait]
impl ProgressStore for RemoteStore {
    async fn fetch_progress(&self, user_id: &str) -> Result<Vec<ProgressRecord>, PersistenceError> {
        let rows: Vec<ProgressRow> = self
            .get_rows(
                Self::PROGRESS_TABLE,
                &[("select", "*".to_string()), ("user_id", format!("eq.{user_id}"))],
            )
            .await?;
        Ok(rows.into_iter().filter_map(ProgressRow::into_record).collect())
    }

    async fn upsert_progress(
        &self,
        user_id: &str,
        record: &ProgressRecord,
    ) -> Result<(), PersistenceError> {
        debug!(tutorial_id = %record.tutorial_id, status = ?record.status, "Upserting progress");
        let request = self
            .client
            .post(self.table_url(Self::PROGRESS_TABLE))
            .query(&[("on_conflict", "user_id,tutorial_id")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&[ProgressRow::from_record(user_id, record)]);

        check_status(self.authorized(request).send().await?).await?;
        Ok(())
    }
}
