//! Space routes.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use tome_core::defaults::CACHE_TTL_LIST_SECS;
use tome_core::{
    cache_keys, Document, DocumentRepository, Error, Space, SpaceRepository, Visibility,
};

use crate::error::ApiError;
use crate::AppState;

/// `GET /spaces` — all spaces, cached.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Space>>, ApiError> {
    let key = cache_keys::spaces_list();
    if let Some(cached) = state.cache.get_json::<Vec<Space>>(&key).await {
        return Ok(Json(cached));
    }

    let spaces = state.store.spaces.list().await?;
    state
        .cache
        .put_json(&key, &spaces, CACHE_TTL_LIST_SECS)
        .await;
    Ok(Json(spaces))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSpaceBody {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub visibility: Option<String>,
    #[serde(default)]
    pub author: String,
}

/// `POST /spaces` — create a space.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateSpaceBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.name.trim().is_empty() {
        return Err(Error::InvalidInput("space name must not be empty".into()).into());
    }

    let now = Utc::now();
    let space = Space {
        id: Uuid::new_v4(),
        name: body.name.trim().to_string(),
        description: body.description,
        icon: body.icon,
        visibility: body
            .visibility
            .as_deref()
            .map(Visibility::parse)
            .unwrap_or_default(),
        document_count: 0,
        created_at: now,
        updated_at: now,
        author: body.author,
    };
    state.store.spaces.insert(space.clone()).await?;
    state
        .cache
        .invalidate(&cache_keys::staled_by_space_write())
        .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "space": space,
    })))
}

/// `GET /spaces/:id/documents` — metadata of every document in a space.
pub async fn documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let key = cache_keys::space_documents(id);
    if let Some(cached) = state.cache.get_json::<Vec<Document>>(&key).await {
        return Ok(Json(cached));
    }

    state
        .store
        .spaces
        .get(id)
        .await?
        .ok_or(Error::SpaceNotFound(id))?;
    let documents = state.store.documents.list_for_space(id).await?;
    state
        .cache
        .put_json(&key, &documents, CACHE_TTL_LIST_SECS)
        .await;
    Ok(Json(documents))
}
