//! Document metadata repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use tome_core::{Document, DocumentRepository, Error, Result};

/// In-memory implementation of [`DocumentRepository`].
#[derive(Clone, Default)]
pub struct MemDocumentRepository {
    inner: Arc<RwLock<HashMap<Uuid, Document>>>,
}

impl MemDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentRepository for MemDocumentRepository {
    async fn insert(&self, document: Document) -> Result<()> {
        self.inner.write().await.insert(document.id, document);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Document>> {
        Ok(self.inner.read().await.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Document>> {
        let mut docs: Vec<Document> = self.inner.read().await.values().cloned().collect();
        docs.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(docs)
    }

    async fn list_for_space(&self, space_id: Uuid) -> Result<Vec<Document>> {
        let mut docs: Vec<Document> = self
            .inner
            .read()
            .await
            .values()
            .filter(|d| d.space_id == space_id)
            .cloned()
            .collect();
        docs.sort_by(|a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()));
        Ok(docs)
    }

    async fn update(&self, document: Document) -> Result<()> {
        let mut docs = self.inner.write().await;
        if !docs.contains_key(&document.id) {
            return Err(Error::DocumentNotFound(document.id));
        }
        docs.insert(document.id, document);
        Ok(())
    }

    async fn merge_view_stats(
        &self,
        id: Uuid,
        views: i64,
        last_viewed: DateTime<Utc>,
    ) -> Result<()> {
        let mut docs = self.inner.write().await;
        let doc = docs.get_mut(&id).ok_or(Error::DocumentNotFound(id))?;
        // Merge with max: a replayed task carrying an older absolute value
        // must not move the counter backwards.
        doc.views = doc.views.max(views);
        doc.last_viewed = Some(match doc.last_viewed {
            Some(existing) => existing.max(last_viewed),
            None => last_viewed,
        });
        Ok(())
    }

    async fn set_folder_path(&self, id: Uuid, folder_path: &str) -> Result<()> {
        let mut docs = self.inner.write().await;
        let doc = docs.get_mut(&id).ok_or(Error::DocumentNotFound(id))?;
        doc.folder_path = folder_path.to_string();
        Ok(())
    }

    async fn count_for_space(&self, space_id: Uuid) -> Result<i64> {
        Ok(self
            .inner
            .read()
            .await
            .values()
            .filter(|d| d.space_id == space_id)
            .count() as i64)
    }

    async fn recent(&self, limit: usize) -> Result<Vec<Document>> {
        let mut docs: Vec<Document> = self.inner.read().await.values().cloned().collect();
        docs.sort_by(|a, b| b.modified_at.cmp(&a.modified_at));
        docs.truncate(limit);
        Ok(docs)
    }

    async fn popular(&self, limit: usize) -> Result<Vec<Document>> {
        let mut docs: Vec<Document> = self.inner.read().await.values().cloned().collect();
        docs.sort_by(|a, b| b.views.cmp(&a.views).then(b.modified_at.cmp(&a.modified_at)));
        docs.truncate(limit);
        Ok(docs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn doc(title: &str, space_id: Uuid) -> Document {
        let id = Uuid::new_v4();
        Document {
            id,
            title: title.to_string(),
            space_id,
            space_name: "Ops".to_string(),
            folder_path: String::new(),
            excerpt: String::new(),
            author: "tester".to_string(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
            views: 0,
            last_viewed: None,
            tags: vec![],
            content_path: Document::blob_path(id),
        }
    }

    #[tokio::test]
    async fn count_for_space_matches_inserted() {
        let repo = MemDocumentRepository::new();
        let space = Uuid::new_v4();
        let other = Uuid::new_v4();
        repo.insert(doc("a", space)).await.unwrap();
        repo.insert(doc("b", space)).await.unwrap();
        repo.insert(doc("c", other)).await.unwrap();
        assert_eq!(repo.count_for_space(space).await.unwrap(), 2);
        assert_eq!(repo.count_for_space(other).await.unwrap(), 1);
        assert_eq!(repo.count_for_space(Uuid::new_v4()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn merge_view_stats_is_idempotent() {
        let repo = MemDocumentRepository::new();
        let d = doc("a", Uuid::new_v4());
        repo.insert(d.clone()).await.unwrap();

        let seen = Utc::now();
        repo.merge_view_stats(d.id, 3, seen).await.unwrap();
        repo.merge_view_stats(d.id, 3, seen).await.unwrap();
        let fetched = repo.get(d.id).await.unwrap().unwrap();
        assert_eq!(fetched.views, 3);

        // An older replay must not regress the counter.
        repo.merge_view_stats(d.id, 1, seen - Duration::seconds(60))
            .await
            .unwrap();
        let fetched = repo.get(d.id).await.unwrap().unwrap();
        assert_eq!(fetched.views, 3);
        assert_eq!(fetched.last_viewed, Some(seen));
    }

    #[tokio::test]
    async fn recent_orders_by_modified_at() {
        let repo = MemDocumentRepository::new();
        let space = Uuid::new_v4();
        let mut old = doc("old", space);
        old.modified_at = Utc::now() - Duration::hours(2);
        let fresh = doc("fresh", space);
        repo.insert(old).await.unwrap();
        repo.insert(fresh).await.unwrap();

        let recent = repo.recent(10).await.unwrap();
        assert_eq!(recent[0].title, "fresh");
        assert_eq!(recent[1].title, "old");
    }

    #[tokio::test]
    async fn popular_orders_by_views() {
        let repo = MemDocumentRepository::new();
        let space = Uuid::new_v4();
        let mut hot = doc("hot", space);
        hot.views = 12;
        repo.insert(hot).await.unwrap();
        repo.insert(doc("cold", space)).await.unwrap();

        let popular = repo.popular(1).await.unwrap();
        assert_eq!(popular.len(), 1);
        assert_eq!(popular[0].title, "hot");
    }

    #[tokio::test]
    async fn update_unknown_document_errors() {
        let repo = MemDocumentRepository::new();
        let err = repo.update(doc("ghost", Uuid::new_v4())).await.unwrap_err();
        assert!(matches!(err, Error::DocumentNotFound(_)));
    }
}
