//! Filesystem blob store.
//!
//! Stores document content bodies under a base directory, one file per blob
//! path (e.g. `documents/<id>.md`). Parent directories are created on write.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use tome_core::{BlobStore, Error, Result};

/// Filesystem implementation of [`BlobStore`].
pub struct FsBlobStore {
    base_path: PathBuf,
}

impl FsBlobStore {
    /// Create a new blob store rooted at the given directory.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    fn full_path(&self, path: &str) -> Result<PathBuf> {
        // Reject traversal out of the base directory; blob paths are always
        // relative.
        let rel = Path::new(path);
        if rel.is_absolute()
            || rel
                .components()
                .any(|c| matches!(c, std::path::Component::ParentDir))
        {
            return Err(Error::InvalidInput(format!("invalid blob path: {path}")));
        }
        Ok(self.base_path.join(rel))
    }

    /// Validate that the store can write, read, and delete files.
    ///
    /// Performs a full round-trip at startup to catch filesystem issues
    /// (permission errors, missing mounts) early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        let test_dir = self.base_path.join(".health-check");
        let test_file = test_dir.join("test.bin");

        fs::create_dir_all(&test_dir)
            .await
            .map_err(|e| format!("create_dir_all({:?}): {}", test_dir, e))?;

        let data = b"blob-store-health-check";
        fs::write(&test_file, data)
            .await
            .map_err(|e| format!("write({:?}): {}", test_file, e))?;

        let read_back = fs::read(&test_file)
            .await
            .map_err(|e| format!("read({:?}): {}", test_file, e))?;
        if read_back != data {
            return Err("read-back mismatch".to_string());
        }

        fs::remove_file(&test_file)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", test_file, e))?;
        let _ = fs::remove_dir(&test_dir).await;

        Ok(())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = self.full_path(path)?;
        debug!(blob_path = %path, size = data.len(), "Writing blob");

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::Storage(format!("create dir for {path}: {e}")))?;
        }
        fs::write(&full_path, data)
            .await
            .map_err(|e| Error::Storage(format!("write {path}: {e}")))
    }

    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = self.full_path(path)?;
        fs::read(&full_path)
            .await
            .map_err(|e| Error::Storage(format!("read {path}: {e}")))
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let full_path = self.full_path(path)?;
        fs::remove_file(&full_path)
            .await
            .map_err(|e| Error::Storage(format!("delete {path}: {e}")))
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        let full_path = self.full_path(path)?;
        Ok(fs::try_exists(&full_path).await.unwrap_or(false))
    }
}
