//! Folder repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use tome_core::{Folder, FolderRepository, Result};

/// In-memory implementation of [`FolderRepository`].
///
/// Folders are keyed by `(space_id, path)` since paths are unique within a
/// space.
#[derive(Clone, Default)]
pub struct MemFolderRepository {
    inner: Arc<RwLock<HashMap<(Uuid, String), Folder>>>,
}

impl MemFolderRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FolderRepository for MemFolderRepository {
    async fn insert(&self, folder: Folder) -> Result<()> {
        self.inner
            .write()
            .await
            .insert((folder.space_id, folder.path.clone()), folder);
        Ok(())
    }

    async fn get_by_path(&self, space_id: Uuid, path: &str) -> Result<Option<Folder>> {
        Ok(self
            .inner
            .read()
            .await
            .get(&(space_id, path.to_string()))
            .cloned())
    }

    async fn list_for_space(&self, space_id: Uuid) -> Result<Vec<Folder>> {
        let mut folders: Vec<Folder> = self
            .inner
            .read()
            .await
            .values()
            .filter(|f| f.space_id == space_id)
            .cloned()
            .collect();
        folders.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(folders)
    }
}
