//! Document routes.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use tome_core::defaults::{
    CACHE_TTL_DETAIL_SECS, CACHE_TTL_LIST_SECS, CACHE_TTL_POPULAR_SECS, DEFAULT_USER,
    RECENT_MAX_ENTRIES,
};
use tome_core::{
    cache_keys, excerpt_of, ActivityRepository, BlobStore, Document, DocumentFull,
    DocumentRepository, Error, RecentEntry, SpaceRepository, Task, TaskQueue,
};

use crate::error::ApiError;
use crate::AppState;

/// `GET /documents` — global metadata listing, cached.
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let key = cache_keys::documents_list();
    if let Some(cached) = state.cache.get_json::<Vec<Document>>(&key).await {
        return Ok(Json(cached));
    }

    let documents = state.store.documents.list().await?;
    state
        .cache
        .put_json(&key, &documents, CACHE_TTL_LIST_SECS)
        .await;
    Ok(Json(documents))
}

/// `GET /documents/recent` — most recently modified, cached.
pub async fn recent(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let key = cache_keys::documents_recent();
    if let Some(cached) = state.cache.get_json::<Vec<Document>>(&key).await {
        return Ok(Json(cached));
    }

    let documents = state.store.documents.recent(RECENT_MAX_ENTRIES).await?;
    state
        .cache
        .put_json(&key, &documents, CACHE_TTL_LIST_SECS)
        .await;
    Ok(Json(documents))
}

/// `GET /documents/popular` — most viewed, cached with the longer TTL.
pub async fn popular(State(state): State<AppState>) -> Result<Json<Vec<Document>>, ApiError> {
    let key = cache_keys::documents_popular();
    if let Some(cached) = state.cache.get_json::<Vec<Document>>(&key).await {
        return Ok(Json(cached));
    }

    let documents = state.store.documents.popular(RECENT_MAX_ENTRIES).await?;
    state
        .cache
        .put_json(&key, &documents, CACHE_TTL_POPULAR_SECS)
        .await;
    Ok(Json(documents))
}

/// `GET /documents/:id` — full document with content.
///
/// Populates the detail cache and defers the view-count bump to the queue:
/// the stored record only changes once the worker processes the task.
pub async fn get_full(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentFull>, ApiError> {
    let key = cache_keys::document_full(id);
    let full = match state.cache.get_json::<DocumentFull>(&key).await {
        Some(cached) => cached,
        None => {
            let document = state
                .store
                .documents
                .get(id)
                .await?
                .ok_or(Error::DocumentNotFound(id))?;
            let content = match state.blobs.read(&document.content_path).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => {
                    // Blob not materialized yet; serve metadata with an
                    // empty body and let the worker create the file.
                    warn!(document_id = %id, error = %err, "Content blob unreadable");
                    state
                        .store
                        .queue
                        .enqueue(Task::CreateDocumentFile {
                            document_id: id,
                            path: document.content_path.clone(),
                            title: document.title.clone(),
                        })
                        .await?;
                    String::new()
                }
            };
            let full = DocumentFull { document, content };
            state
                .cache
                .put_json(&key, &full, CACHE_TTL_DETAIL_SECS)
                .await;
            full
        }
    };

    let now = Utc::now();
    // The cached detail keeps whatever count it was populated with, so the
    // bump is computed from the stored record; a cached `views` would pin
    // the max-merged counter for the whole TTL.
    if let Some(stored) = state.store.documents.get(id).await? {
        state
            .store
            .queue
            .enqueue(Task::UpdateDocumentMetadata {
                document_id: id,
                views: stored.views + 1,
                last_viewed: now,
            })
            .await?;
    }

    state
        .store
        .activity
        .record_visit(
            DEFAULT_USER,
            RecentEntry {
                path: virtual_path(&full.document),
                space_name: full.document.space_name.clone(),
                title: full.document.title.clone(),
                action: "viewed".to_string(),
                visited_at: now,
            },
        )
        .await?;

    Ok(Json(full))
}

/// The user-facing path of a document within its space.
pub fn virtual_path(document: &Document) -> String {
    if document.folder_path.is_empty() {
        document.title.clone()
    } else {
        format!("{}/{}", document.folder_path, document.title)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentBody {
    pub title: String,
    #[serde(default)]
    pub content: String,
    pub space_id: Uuid,
    #[serde(default)]
    pub folder_path: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: String,
}

/// `POST /documents` — create metadata plus blob, index, and enqueue the
/// space recount.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateDocumentBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if body.title.trim().is_empty() {
        return Err(Error::InvalidInput("document title must not be empty".into()).into());
    }
    let space = state
        .store
        .spaces
        .get(body.space_id)
        .await?
        .ok_or(Error::SpaceNotFound(body.space_id))?;

    let id = Uuid::new_v4();
    let now = Utc::now();
    let document = Document {
        id,
        title: body.title.trim().to_string(),
        space_id: space.id,
        space_name: space.name.clone(),
        folder_path: body.folder_path,
        excerpt: excerpt_of(&body.content),
        author: body.author,
        created_at: now,
        modified_at: now,
        views: 0,
        last_viewed: None,
        tags: body.tags,
        content_path: Document::blob_path(id),
    };

    state
        .blobs
        .write(&document.content_path, body.content.as_bytes())
        .await?;
    state.store.documents.insert(document.clone()).await?;

    state
        .store
        .queue
        .enqueue(Task::UpdateSpaceDocumentCount { space_id: space.id })
        .await?;
    state.engine.index_document(&document, &body.content).await;
    state
        .cache
        .invalidate(&cache_keys::staled_by_document_write(id, space.id))
        .await;

    Ok(Json(serde_json::json!({
        "success": true,
        "document": document,
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentBody {
    pub id: Uuid,
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
}

/// `PUT /documents` — update metadata and/or content, bump `modified_at`,
/// re-index, invalidate.
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<UpdateDocumentBody>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let mut document = state
        .store
        .documents
        .get(body.id)
        .await?
        .ok_or(Error::DocumentNotFound(body.id))?;

    if let Some(title) = body.title {
        if title.trim().is_empty() {
            return Err(Error::InvalidInput("document title must not be empty".into()).into());
        }
        document.title = title.trim().to_string();
    }
    if let Some(tags) = body.tags {
        document.tags = tags;
    }

    let content = match body.content {
        Some(content) => {
            document.excerpt = excerpt_of(&content);
            state
                .blobs
                .write(&document.content_path, content.as_bytes())
                .await?;
            content
        }
        None => match state.blobs.read(&document.content_path).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(_) => String::new(),
        },
    };
    document.modified_at = Utc::now();

    state.store.documents.update(document.clone()).await?;
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
