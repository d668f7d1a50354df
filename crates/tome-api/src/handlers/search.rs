//! Search routes.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::error;

use tome_core::{IndexStats, SearchResponse};
use tome_search::SearchRequest;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
    /// Comma-separated file extensions.
    pub file_types: Option<String>,
    /// Comma-separated file categories.
    pub base_types: Option<String>,
    #[serde(default)]
    pub include_content: bool,
}

fn split_csv(value: &Option<String>) -> Vec<String> {
    value
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `GET /search` — ranked search.
pub async fn query(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>, ApiError> {
    let mut request = SearchRequest::new(params.q)
        .with_file_types(split_csv(&params.file_types))
        .with_base_types(split_csv(&params.base_types))
        .with_content(params.include_content);
    if let Some(limit) = params.limit {
        request = request.with_max_results(limit);
    }

    let response = state.engine.search(&request).await?;
    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

/// `GET /search/suggestions` — vocabulary prefix matches.
pub async fn suggestions(
    State(state): State<AppState>,
    Query(params): Query<SuggestQuery>,
) -> Json<Vec<String>> {
    Json(state.engine.suggestions(&params.q, params.limit).await)
}

/// `GET /search/stats` — index statistics.
pub async fn stats(State(state): State<AppState>) -> Json<IndexStats> {
    Json(state.engine.stats().await)
}

/// `POST /search/rebuild` — kick off a full rebuild and return immediately.
pub async fn rebuild(State(state): State<AppState>) -> Json<serde_json::Value> {
    let engine = state.engine.clone();
    tokio::spawn(async move {
        if let Err(err) = engine.rebuild().await {
            error!(error = %err, "Index rebuild failed");
        }
    });
    Json(serde_json::json!({ "success": true, "status": "rebuilding" }))
}
