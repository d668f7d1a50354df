//! Folder and hierarchy routes.

use axum::extract::{Path, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use tome_core::defaults::CACHE_TTL_LIST_SECS;
use tome_core::{cache_keys, BlobStore, Error, SpaceRepository, TreeNode};

use crate::error::ApiError;
use crate::AppState;

/// `GET /spaces/:id/folders` — the ordered folder/document tree.
pub async fn tree(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<TreeNode>>, ApiError> {
    let key = cache_keys::space_tree(id);
    if let Some(cached) = state.cache.get_json::<Vec<TreeNode>>(&key).await {
        return Ok(Json(cached));
    }

    state
        .store
        .spaces
        .get(id)
        .await?
        .ok_or(Error::SpaceNotFound(id))?;
    let tree = state.store.hierarchy().tree(id).await?;
    state.cache.put_json(&key, &tree, CACHE_TTL_LIST_SECS).await;
    Ok(Json(tree))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFolderBody {
    pub name: String,
    pub space_id: Uuid,
    #[serde(default)]
    pub parent_path: String,
}

/// `POST /folders` — create a folder.
///
/// An unknown `parent_path` places the folder at the root; see
/// `HierarchyManager::create_folder`.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateFolderBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    state
        .store
        .spaces
        .get(body.space_id)
        .await?
        .ok_or(Error::SpaceNotFound(body.space_id))?;

    let folder = state
        .store
        .hierarchy()
        .create_folder(body.space_id, &body.name, &body.parent_path)
        .await?;
    state
        .cache
        .invalidate(&cache_keys::staled_by_folder_write(body.space_id))
        .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "folder": folder,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDocumentBody {
    #[serde(default)]
    pub folder_path: String,
}

/// `PUT /documents/:id/move` — move a document to another folder.
pub async fn move_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<MoveDocumentBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let document = state
        .store
        .hierarchy()
        .move_document(id, &body.folder_path)
        .await?;

    // folder_path is part of the indexed view of the document.
    let content = match state.blobs.read(&document.content_path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    };
    state.engine.index_document(&document, &content).await;
    state
        .cache
        .invalidate(&cache_keys::staled_by_document_write(
            document.id,
            document.space_id,
        ))
        .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "document": document,
    })))
}
