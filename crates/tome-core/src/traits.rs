//! Core traits for the tome abstractions.
//!
//! These traits define the narrow contracts through which the engine
//! consumes its collaborators — the durable store, the blob store, the cache
//! store, and the task queue — enabling pluggable backends and testability.
//! The engine never depends on any backend's internals.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// DURABLE STORE CONTRACTS
// =============================================================================

/// Repository for space records.
#[async_trait]
pub trait SpaceRepository: Send + Sync {
    /// Insert a new space.
    async fn insert(&self, space: Space) -> Result<()>;

    /// Fetch a space by id.
    async fn get(&self, id: Uuid) -> Result<Option<Space>>;

    /// List all spaces.
    async fn list(&self) -> Result<Vec<Space>>;

    /// Write the derived document count back (worker-only mutation).
    async fn set_document_count(&self, id: Uuid, count: i64) -> Result<()>;
}

/// Repository for document metadata records. Content bodies live in the
/// blob store, never here.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert a new document record.
    async fn insert(&self, document: Document) -> Result<()>;

    /// Fetch a document by id.
    async fn get(&self, id: Uuid) -> Result<Option<Document>>;

    /// List all documents (metadata only).
    async fn list(&self) -> Result<Vec<Document>>;

    /// List documents in a space.
    async fn list_for_space(&self, space_id: Uuid) -> Result<Vec<Document>>;

    /// Replace a document record.
    async fn update(&self, document: Document) -> Result<()>;

    /// Merge view stats into a document record (worker-only mutation).
    /// Views are merged with `max` so replayed tasks are idempotent.
    async fn merge_view_stats(
        &self,
        id: Uuid,
        views: i64,
        last_viewed: DateTime<Utc>,
    ) -> Result<()>;

    /// Rewrite a document's folder path (hierarchy move).
    async fn set_folder_path(&self, id: Uuid, folder_path: &str) -> Result<()>;

    /// Count documents whose space matches.
    async fn count_for_space(&self, space_id: Uuid) -> Result<i64>;

    /// Most recently modified documents.
    async fn recent(&self, limit: usize) -> Result<Vec<Document>>;

    /// Most viewed documents.
    async fn popular(&self, limit: usize) -> Result<Vec<Document>>;
}

/// Repository for folder records.
#[async_trait]
pub trait FolderRepository: Send + Sync {
    /// Insert a new folder.
    async fn insert(&self, folder: Folder) -> Result<()>;

    /// Fetch a folder by its path within a space.
    async fn get_by_path(&self, space_id: Uuid, path: &str) -> Result<Option<Folder>>;

    /// List all folders in a space.
    async fn list_for_space(&self, space_id: Uuid) -> Result<Vec<Folder>>;
}

/// Repository for per-user activity (starred + recent lists).
#[async_trait]
pub trait ActivityRepository: Send + Sync {
    /// Record a visit. Deduplicates by `(path, space_name)`, keeps the list
    /// most-recent-first, and truncates to the configured maximum.
    async fn record_visit(&self, user_id: &str, entry: RecentEntry) -> Result<()>;

    /// Toggle a star. Returns `true` when the entry is now starred.
    async fn toggle_star(&self, user_id: &str, entry: StarredEntry) -> Result<bool>;

    /// Fetch a user's activity (empty default for unknown users).
    async fn get(&self, user_id: &str) -> Result<UserActivity>;
}

// =============================================================================
// BLOB STORE CONTRACT
// =============================================================================

/// Path-addressed byte storage for document content bodies.
///
/// Allows abstracting over filesystem, object storage, or in-memory
/// implementations.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write data to the specified path.
    async fn write(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Read data from the specified path.
    async fn read(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete data at the specified path.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Check if data exists at the specified path.
    async fn exists(&self, path: &str) -> Result<bool>;
}

// =============================================================================
// CACHE STORE CONTRACT
// =============================================================================

/// TTL-based key/value cache.
///
/// The cache is a performance optimization, never a correctness dependency:
/// callers treat every error as a miss (reads) or a no-op (writes).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Get a value, or `None` on miss/expiry.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store a value with a TTL in seconds.
    async fn put(&self, key: &str, value: String, ttl_secs: u64) -> Result<()>;

    /// Delete a key (no-op when absent).
    async fn delete(&self, key: &str) -> Result<()>;
}

// =============================================================================
// TASK QUEUE CONTRACT
// =============================================================================

/// FIFO queue of deferred consistency tasks.
///
/// No priorities, no deduplication: duplicate tasks are processed
/// independently, which is safe because every task is idempotent by
/// construction.
#[async_trait]
pub trait TaskQueue: Send + Sync {
    /// Append a task.
    async fn enqueue(&self, task: Task) -> Result<()>;

    /// Pop the oldest task, or `None` when the queue is empty. Non-blocking.
    async fn dequeue(&self) -> Result<Option<Task>>;

    /// Number of tasks waiting.
    async fn pending_count(&self) -> Result<usize>;
}
