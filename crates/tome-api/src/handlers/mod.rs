//! Route handlers, one module per resource.

pub mod activity;
pub mod content;
pub mod documents;
pub mod folders;
pub mod search;
pub mod spaces;

use axum::Json;

/// Liveness probe.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
