//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::error;

/// API-level error with an HTTP status.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Internal(tome_core::Error),
}

impl From<tome_core::Error> for ApiError {
    fn from(err: tome_core::Error) -> Self {
        match &err {
            tome_core::Error::NotFound(msg) => ApiError::NotFound(msg.clone()),
            tome_core::Error::SpaceNotFound(id) => ApiError::NotFound(format!("Space {id} not found")),
            tome_core::Error::DocumentNotFound(id) => {
                ApiError::NotFound(format!("Document {id} not found"))
            }
            tome_core::Error::FolderNotFound(path) => {
                ApiError::NotFound(format!("Folder {path:?} not found"))
            }
            tome_core::Error::InvalidInput(msg) => ApiError::BadRequest(msg.clone()),
            _ => ApiError::Internal(err),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(err) => {
                // Internal detail goes to the log, not the wire.
                error!(error = %err, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(serde_json::json!({
            "error": message,
        }));
        (status, body).into_response()
    }
}
