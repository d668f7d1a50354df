//! Activity feed routes (starred + recent visits).

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use uuid::Uuid;

use tome_core::defaults::DEFAULT_USER;
use tome_core::{ActivityRepository, DocumentRepository, Error, StarredEntry, UserActivity};

use crate::error::ApiError;
use crate::handlers::documents::virtual_path;
use crate::AppState;

/// `GET /recent` — the combined activity feed.
pub async fn feed(State(state): State<AppState>) -> Result<Json<UserActivity>, ApiError> {
    let activity = state.store.activity.get(DEFAULT_USER).await?;
    Ok(Json(activity))
}

/// `POST /documents/:id/star` — toggle a star on a document.
pub async fn toggle_star(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let document = state
        .store
        .documents
        .get(id)
        .await?
        .ok_or(Error::DocumentNotFound(id))?;

    let starred = state
        .store
        .activity
        .toggle_star(
            DEFAULT_USER,
            StarredEntry {
                path: virtual_path(&document),
                space_name: document.space_name.clone(),
                title: document.title.clone(),
                starred_at: Utc::now(),
            },
        )
        .await?;

    Ok(Json(serde_json::json!({ "starred": starred })))
}
