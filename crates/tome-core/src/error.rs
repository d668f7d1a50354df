//! Error types for the tome content engine.

use thiserror::Error;

/// Result type alias using tome's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tome operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Space not found
    #[error("Space not found: {0}")]
    SpaceNotFound(uuid::Uuid),

    /// Document not found
    #[error("Document not found: {0}")]
    DocumentNotFound(uuid::Uuid),

    /// Folder not found (addressed by path within a space)
    #[error("Folder not found: {0}")]
    FolderNotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Durable or blob store operation failed
    #[error("Storage error: {0}")]
    Storage(String),

    /// Cache store operation failed (recoverable by contract)
    #[error("Cache error: {0}")]
    Cache(String),

    /// Search/indexing operation failed
    #[error("Index error: {0}")]
    Index(String),

    /// Task queue error
    #[error("Queue error: {0}")]
    Queue(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("activity feed".to_string());
        assert_eq!(err.to_string(), "Not found: activity feed");
    }

    #[test]
    fn test_error_display_space_not_found() {
        let id = Uuid::nil();
        let err = Error::SpaceNotFound(id);
        assert_eq!(err.to_string(), format!("Space not found: {}", id));
    }

    #[test]
    fn test_error_display_document_not_found() {
        let id = Uuid::new_v4();
        let err = Error::DocumentNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_folder_not_found() {
        let err = Error::FolderNotFound("ops/runbooks".to_string());
        assert_eq!(err.to_string(), "Folder not found: ops/runbooks");
    }

    #[test]
    fn test_error_display_invalid_input() {
        let err = Error::InvalidInput("title is required".to_string());
        assert_eq!(err.to_string(), "Invalid input: title is required");
    }

    #[test]
    fn test_error_display_storage() {
        let err = Error::Storage("blob write failed".to_string());
        assert_eq!(err.to_string(), "Storage error: blob write failed");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number").unwrap_err();
        let err: Error = json_err.into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
