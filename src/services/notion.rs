// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Notion API client for the activity database.
//!
//! Pages are created under the configured database, updated in place, and
//! archived on delete (Notion has no hard delete for pages).

use crate::config::Config;
use crate::error::AppError;
use crate::models::page::properties;
use crate::models::DownstreamPage;
use serde::Deserialize;
use serde_json::{json, Map, Value};

const NOTION_VERSION: &str = "2022-06-28";
const PAGE_SIZE: u32 = 100;

/// Notion API client.
#[derive(Clone)]
pub struct NotionClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    database_id: String,
    exercises_database_id: Option<String>,
}

/// Query response page from `POST /databases/{id}/query`.
#[derive(Deserialize)]
struct QueryResponse {
    results: Vec<DownstreamPage>,
    #[serde(default)]
    has_more: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

impl NotionClient {
    pub fn new(http: reqwest::Client, config: &Config) -> Self {
        Self {
            http,
            api_url: config.notion_api_url.trim_end_matches('/').to_string(),
            api_key: config.notion_api_key.clone(),
            database_id: config.notion_database_id.clone(),
            exercises_database_id: config.notion_exercises_database_id.clone(),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        self.http
            .request(method, format!("{}{}", self.api_url, path))
            .bearer_auth(&self.api_key)
            .header("Notion-Version", NOTION_VERSION)
    }

    // ─── Writes ──────────────────────────────────────────────────────────────

    /// Create a page in the activity database.
    pub async fn create_page(
        &self,
        props: Map<String, Value>,
    ) -> Result<DownstreamPage, AppError> {
        let body = json!({
            "parent": { "database_id": self.database_id },
            "properties": props,
        });

        let response = self
            .request(reqwest::Method::POST, "/pages")
            .json(&body)
            .send()
            .await
            .map_err(|e| write_error(None, e.to_string()))?;

        let page: DownstreamPage = parse_json(response, write_error).await?;
        tracing::info!(page_id = %page.id, "Notion page created");
        Ok(page)
    }

    /// Replace the given properties on an existing page.
    pub async fn update_page(
        &self,
        page_id: &str,
        props: Map<String, Value>,
    ) -> Result<DownstreamPage, AppError> {
        let response = self
            .request(reqwest::Method::PATCH, &format!("/pages/{}", page_id))
            .json(&json!({ "properties": props }))
            .send()
            .await
            .map_err(|e| write_error(None, e.to_string()))?;

        let page: DownstreamPage = parse_json(response, write_error).await?;
        tracing::info!(page_id = %page.id, "Notion page updated");
        Ok(page)
    }

    /// Archive (soft-delete) a page.
    pub async fn archive_page(&self, page_id: &str) -> Result<(), AppError> {
        let response = self
            .request(reqwest::Method::PATCH, &format!("/pages/{}", page_id))
            .json(&json!({ "archived": true }))
            .send()
            .await
            .map_err(|e| write_error(None, e.to_string()))?;

        let _: Value = parse_json(response, write_error).await?;
        tracing::info!(page_id, "Notion page archived");
        Ok(())
    }

    // ─── Reads ───────────────────────────────────────────────────────────────

    /// All pages of the activity database whose `strava_id` is populated,
    /// in the order Notion lists them.
    pub async fn list_strava_pages(&self) -> Result<Vec<DownstreamPage>, AppError> {
        let filter = json!({
            "and": [{ "property": properties::STRAVA_ID, "rich_text": { "is_not_empty": true } }]
        });
        self.query_database(&self.database_id, Some(filter)).await
    }

    /// Load the exercises database, if one is configured.
    pub async fn exercise_index(&self) -> Result<Option<ExerciseIndex>, AppError> {
        let Some(database_id) = &self.exercises_database_id else {
            return Ok(None);
        };

        let pages = self.query_database(database_id, None).await?;
        let entries = pages
            .iter()
            .filter_map(|p| p.title().map(|t| (p.id.clone(), t.to_string())))
            .collect();

        Ok(Some(ExerciseIndex { entries }))
    }

    /// Query a database, following pagination cursors to the end.
    async fn query_database(
        &self,
        database_id: &str,
        filter: Option<Value>,
    ) -> Result<Vec<DownstreamPage>, AppError> {
        let mut pages = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut body = json!({ "page_size": PAGE_SIZE });
            if let Some(filter) = &filter {
                body["filter"] = filter.clone();
            }
            if let Some(cursor) = &cursor {
                body["start_cursor"] = json!(cursor);
            }

            let response = self
                .request(
                    reqwest::Method::POST,
                    &format!("/databases/{}/query", database_id),
                )
                .json(&body)
                .send()
                .await
                .map_err(|e| read_error(None, e.to_string()))?;

            let batch: QueryResponse = parse_json(response, read_error).await?;
            pages.extend(batch.results);

            match batch.next_cursor {
                Some(next) if batch.has_more => cursor = Some(next),
                _ => break,
            }
        }

        tracing::debug!(database_id, count = pages.len(), "Queried Notion database");
        Ok(pages)
    }
}

fn write_error(status: Option<u16>, message: String) -> AppError {
    AppError::DownstreamWriteFailed { status, message }
}

fn read_error(status: Option<u16>, message: String) -> AppError {
    AppError::DownstreamReadFailed { status, message }
}

/// Check response status and parse the JSON body, mapping failures with `err`.
async fn parse_json<T: for<'de> Deserialize<'de>>(
    response: reqwest::Response,
    err: fn(Option<u16>, String) -> AppError,
) -> Result<T, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(err(
            Some(status.as_u16()),
            format!("HTTP {}: {}", status, body),
        ));
    }

    response
        .json()
        .await
        .map_err(|e| err(Some(status.as_u16()), format!("JSON parse error: {}", e)))
}

/// Exercise pages by title, used to translate the "Exercises Done" relation
/// between page IDs and exercise names.
#[derive(Debug, Clone, Default)]
pub struct ExerciseIndex {
    /// (page ID, title) in database order
    entries: Vec<(String, String)>,
}

impl ExerciseIndex {
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// Page IDs for the given names, in name order. Unknown names are skipped.
    pub fn ids_for(&self, names: &[String]) -> Vec<String> {
        names
            .iter()
            .filter_map(|name| {
                let id = self
                    .entries
                    .iter()
                    .find(|(_, title)| title == name)
                    .map(|(id, _)| id.clone());
                if id.is_none() {
                    tracing::warn!(exercise = %name, "No exercise page with this name, skipping relation");
                }
                id
            })
            .collect()
    }

    /// Exercise names for the given page IDs. Unknown IDs are skipped.
    pub fn names_for(&self, ids: &[String]) -> Vec<String> {
        ids.iter()
            .filter_map(|id| {
                let name = self
                    .entries
                    .iter()
                    .find(|(entry_id, _)| entry_id == id)
                    .map(|(_, title)| title.clone());
                if name.is_none() {
                    tracing::warn!(exercise_id = %id, "Related exercise page not in exercises database");
                }
                name
            })
            .collect()
    }

    /// Relation for a page being updated: its current IDs in order, followed
    /// by the IDs for `names` not already related.
    ///
    /// Current IDs the index cannot resolve (archived exercise pages, for
    /// instance) are kept rather than dropped by the rewrite.
    pub fn merged_relation(&self, existing: &[String], names: &[String]) -> Vec<String> {
        let mut merged = existing.to_vec();
        for id in self.ids_for(names) {
            if !merged.contains(&id) {
                merged.push(id);
            }
        }
        merged
    }
}
