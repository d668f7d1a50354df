//! Space repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use tome_core::{Error, Result, Space, SpaceRepository};

/// In-memory implementation of [`SpaceRepository`].
#[derive(Clone, Default)]
pub struct MemSpaceRepository {
    inner: Arc<RwLock<HashMap<Uuid, Space>>>,
}

impl MemSpaceRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SpaceRepository for MemSpaceRepository {
    async fn insert(&self, space: Space) -> Result<()> {
        self.inner.write().await.insert(space.id, space);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Space>> {
        Ok(self.inner.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Space>> {
        let mut spaces: Vec<Space> = self.inner.read().await.values().cloned().collect();
        spaces.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        Ok(spaces)
    }

    async fn set_document_count(&self, id: Uuid, count: i64) -> Result<()> {
        let mut spaces = self.inner.write().await;
        let space = spaces.get_mut(&id).ok_or(Error::SpaceNotFound(id))?;
        space.document_count = count;
        space.updated_at = chrono::Utc::now();
        Ok(())
    }
}
