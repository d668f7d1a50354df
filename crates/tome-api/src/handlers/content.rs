//! Path-addressed content routes.
//!
//! These routes address documents by their user-facing path within a space
//! (`folder/Title`, optionally with a `.md` suffix) rather than by id.

use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;

use tome_core::{
    cache_keys, detect_file_metadata, excerpt_of, BlobStore, Document, DocumentRepository, Error,
    Task, TaskQueue,
};

use crate::error::ApiError;
use crate::handlers::documents::virtual_path;
use crate::AppState;

fn normalize(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    trimmed
        .strip_suffix(".md")
        .unwrap_or(trimmed)
        .to_lowercase()
}

/// Resolve a document by space name and user-facing path.
async fn resolve(state: &AppState, space_name: &str, path: &str) -> Result<Option<Document>, Error> {
    let wanted = normalize(path);
    let documents = state.store.documents.list().await?;
    Ok(documents
        .into_iter()
        .find(|doc| doc.space_name == space_name && normalize(&virtual_path(doc)) == wanted))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentQuery {
    pub path: String,
    pub space_name: String,
    #[serde(default)]
    pub metadata: bool,
    #[serde(default)]
    pub enhanced: bool,
    #[serde(default)]
    pub download: bool,
}

/// `GET /documents/content` — raw or enhanced file read.
///
/// A missing document or unreadable blob yields a synthesized not-found
/// body instead of an error, so readers navigating stale links still get a
/// page.
pub async fn read(
    State(state): State<AppState>,
    Query(query): Query<ContentQuery>,
) -> Result<Response, ApiError> {
    let document = resolve(&state, &query.space_name, &query.path).await?;

    let (bytes, found) = match &document {
        Some(doc) => match state.blobs.read(&doc.content_path).await {
            Ok(bytes) => (bytes, true),
            Err(err) => {
                // Known document, missing file: hand the reader a
                // placeholder and queue the materialization.
                warn!(document_id = %doc.id, error = %err, "Content blob unreadable");
                state
                    .store
                    .queue
                    .enqueue(Task::CreateDocumentFile {
                        document_id: doc.id,
                        path: doc.content_path.clone(),
                        title: doc.title.clone(),
                    })
                    .await?;
                (synthesized_not_found(&query.path), false)
            }
        },
        None => (synthesized_not_found(&query.path), false),
    };

    let meta = detect_file_metadata(&query.path, &bytes);

    if query.metadata {
        return Ok(Json(meta).into_response());
    }
    if query.enhanced {
        return Ok(Json(serde_json::json!({
            "content": String::from_utf8_lossy(&bytes),
            "metadata": meta,
            "found": found,
        }))
        .into_response());
    }

    let mut response = (
        StatusCode::OK,
        [(header::CONTENT_TYPE, meta.mime_type.clone())],
        bytes,
    )
        .into_response();
    if query.download {
        let filename = query.path.rsplit('/').next().unwrap_or("content.md");
        if let Ok(value) = format!("attachment; filename=\"{filename}\"").parse() {
            response
                .headers_mut()
                .insert(header::CONTENT_DISPOSITION, value);
        }
    }
    Ok(response)
}

fn synthesized_not_found(path: &str) -> Vec<u8> {
    let name = path.rsplit('/').next().unwrap_or(path);
    format!("# {name}\n\nThis page does not exist yet.\n")
        .into_bytes()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WriteContentBody {
    pub path: String,
    pub space_name: String,
    pub content: String,
}

/// `PUT /documents/content` — raw file write plus re-index.
pub async fn write(
    State(state): State<AppState>,
    Json(body): Json<WriteContentBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut document = resolve(&state, &body.space_name, &body.path)
        .await?
        .ok_or_else(|| Error::NotFound(format!("no document at {:?}", body.path)))?;

    state
        .blobs
        .write(&document.content_path, body.content.as_bytes())
        .await?;
    document.excerpt = excerpt_of(&body.content);
    document.modified_at = Utc::now();
    state.store.documents.update(document.clone()).await?;

    state.engine.index_document(&document, &body.content).await;
    state
        .cache
        .invalidate(&cache_keys::staled_by_document_write(
            document.id,
            document.space_id,
        ))
        .await;

    Ok(Json(serde_json::json!({ "success": true })))
}
