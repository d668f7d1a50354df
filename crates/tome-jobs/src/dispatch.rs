//! Task dispatch: one function per task type.

use std::sync::Arc;

use tracing::{debug, info};

use tome_core::{
    BlobStore, DocumentRepository, Result, SpaceRepository, Task, TaskQueue,
};

/// Executes individual consistency tasks against the store.
#[derive(Clone)]
pub struct Dispatcher {
    documents: Arc<dyn DocumentRepository>,
    spaces: Arc<dyn SpaceRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl Dispatcher {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        spaces: Arc<dyn SpaceRepository>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            documents,
            spaces,
            blobs,
        }
    }

    /// Run one task to completion.
    ///
    /// Each arm is idempotent: merges take the max, counts are recomputed
    /// from scratch, and file creation skips existing blobs. Replaying any
    /// task leaves the store unchanged.
    pub async fn run_task(&self, task: &Task) -> Result<()> {
        match task {
            Task::UpdateDocumentMetadata {
                document_id,
                views,
                last_viewed,
            } => {
                self.documents
                    .merge_view_stats(*document_id, *views, *last_viewed)
                    .await?;
                debug!(document_id = %document_id, views, "Merged view stats");
            }
            Task::UpdateSpaceDocumentCount { space_id } => {
                let count = self.documents.count_for_space(*space_id).await?;
                self.spaces.set_document_count(*space_id, count).await?;
                debug!(space_id = %space_id, count, "Recomputed space document count");
            }
            Task::CreateDocumentFile {
                document_id,
                path,
                title,
            } => {
                if self.blobs.exists(path).await? {
                    debug!(document_id = %document_id, blob_path = %path, "Blob already exists, skipping");
                } else {
                    let content = format!("# {title}\n");
                    self.blobs.write(path, content.as_bytes()).await?;
                    info!(document_id = %document_id, blob_path = %path, "Materialized document file");
                }
            }
        }
        Ok(())
    }
}

/// Drain the queue synchronously, running every pending task in FIFO order.
///
/// Returns the number of tasks processed. Failed tasks are dropped, matching
/// the worker's default policy.
pub async fn run_pending(queue: &dyn TaskQueue, dispatcher: &Dispatcher) -> Result<usize> {
    let mut processed = 0;
    while let Some(task) = queue.dequeue().await? {
        if let Err(err) = dispatcher.run_task(&task).await {
            tracing::warn!(task_kind = task.kind(), error = %err, "Task failed, dropping");
        }
        processed += 1;
    }
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    use tome_core::{Document, Space, Visibility};
    use tome_store::{FsBlobStore, Store};

    struct Fixture {
        store: Store,
        dispatcher: Dispatcher,
        blobs: Arc<FsBlobStore>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new();
        let blobs = Arc::new(FsBlobStore::new(dir.path()));
        let dispatcher = Dispatcher::new(
            Arc::new(store.documents.clone()),
            Arc::new(store.spaces.clone()),
            blobs.clone(),
        );
        Fixture {
            store,
            dispatcher,
            blobs,
            _dir: dir,
        }
    }

    fn doc(space_id: Uuid) -> Document {
        let id = Uuid::new_v4();
        Document {
            id,
            title: "notes".to_string(),
            space_id,
            space_name: "eng".to_string(),
            folder_path: String::new(),
            excerpt: String::new(),
            author: "test".to_string(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
            views: 0,
            last_viewed: None,
            tags: vec![],
            content_path: Document::blob_path(id),
        }
    }

    fn space() -> Space {
        Space {
            id: Uuid::new_v4(),
            name: "eng".to_string(),
            description: String::new(),
            icon: String::new(),
            visibility: Visibility::Team,
            author: "test".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            document_count: 0,
        }
    }

    #[tokio::test]
    async fn update_metadata_merges_views() {
        let fx = fixture();
        let d = doc(Uuid::new_v4());
        fx.store.documents.insert(d.clone()).await.unwrap();

        let now = Utc::now();
        let task = Task::UpdateDocumentMetadata {
            document_id: d.id,
            views: 5,
            last_viewed: now,
        };
        fx.dispatcher.run_task(&task).await.unwrap();
        // Replaying the same task must not change anything.
        fx.dispatcher.run_task(&task).await.unwrap();

        let stored = fx.store.documents.get(d.id).await.unwrap().unwrap();
        assert_eq!(stored.views, 5);
        assert_eq!(stored.last_viewed, Some(now));
    }

    #[tokio::test]
    async fn space_count_recomputed_from_scratch() {
        let fx = fixture();
        let s = space();
        fx.store.spaces.insert(s.clone()).await.unwrap();
        for _ in 0..3 {
            fx.store.documents.insert(doc(s.id)).await.unwrap();
        }

        let task = Task::UpdateSpaceDocumentCount { space_id: s.id };
        fx.dispatcher.run_task(&task).await.unwrap();
        fx.dispatcher.run_task(&task).await.unwrap();

        let stored = fx.store.spaces.get(s.id).await.unwrap().unwrap();
        assert_eq!(stored.document_count, 3);
    }

    #[tokio::test]
    async fn create_file_skips_existing_blob() {
        let fx = fixture();
        let d = doc(Uuid::new_v4());
        fx.blobs
            .write(&d.content_path, b"original body")
            .await
            .unwrap();

        let task = Task::CreateDocumentFile {
            document_id: d.id,
            path: d.content_path.clone(),
            title: d.title.clone(),
        };
        fx.dispatcher.run_task(&task).await.unwrap();

        let content = fx.blobs.read(&d.content_path).await.unwrap();
        assert_eq!(content, b"original body");
    }

    #[tokio::test]
    async fn create_file_writes_default_content() {
        let fx = fixture();
        let d = doc(Uuid::new_v4());

        let task = Task::CreateDocumentFile {
            document_id: d.id,
            path: d.content_path.clone(),
            title: "Getting Started".to_string(),
        };
        fx.dispatcher.run_task(&task).await.unwrap();

        let content = fx.blobs.read(&d.content_path).await.unwrap();
        assert_eq!(content, b"# Getting Started\n");
    }

    #[tokio::test]
    async fn run_pending_drains_fifo_and_drops_failures() {
        let fx = fixture();
        let s = space();
        fx.store.spaces.insert(s.clone()).await.unwrap();
        let d = doc(s.id);
        fx.store.documents.insert(d.clone()).await.unwrap();

        // Middle task targets a missing document and fails; the drain keeps
        // going.
        fx.store
            .queue
            .enqueue(Task::UpdateSpaceDocumentCount { space_id: s.id })
            .await
            .unwrap();
        fx.store
            .queue
            .enqueue(Task::UpdateDocumentMetadata {
                document_id: Uuid::new_v4(),
                views: 1,
                last_viewed: Utc::now(),
            })
            .await
            .unwrap();
        fx.store
            .queue
            .enqueue(Task::UpdateDocumentMetadata {
                document_id: d.id,
                views: 2,
                last_viewed: Utc::now(),
            })
            .await
            .unwrap();

        let processed = run_pending(&fx.store.queue, &fx.dispatcher).await.unwrap();
        assert_eq!(processed, 3);
        assert_eq!(fx.store.queue.pending_count().await.unwrap(), 0);

        let stored = fx.store.documents.get(d.id).await.unwrap().unwrap();
        assert_eq!(stored.views, 2);
        let stored_space = fx.store.spaces.get(s.id).await.unwrap().unwrap();
        assert_eq!(stored_space.document_count, 1);
    }
}
