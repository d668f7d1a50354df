//! # tome-store
//!
//! Storage layer for the tome content engine.
//!
//! This crate provides:
//! - In-memory repositories for spaces, documents, folders, and activity
//!   (the durable-store collaborator realized behind the core traits)
//! - A filesystem blob store for document content bodies
//! - A TTL key/value cache store
//! - A FIFO task queue for the consistency worker
//! - The hierarchy manager (folder/document tree construction and mutation)
//!
//! The engine consumes all of these strictly through the `tome_core` traits;
//! per-key writes are atomic (one lock per repository map) and there are no
//! multi-key transactions.

pub mod activity;
pub mod blob;
pub mod cache;
pub mod documents;
pub mod folders;
pub mod hierarchy;
pub mod queue;
pub mod spaces;

pub use activity::MemActivityRepository;
pub use blob::FsBlobStore;
pub use cache::MemoryCache;
pub use documents::MemDocumentRepository;
pub use folders::MemFolderRepository;
pub use hierarchy::HierarchyManager;
pub use queue::MemTaskQueue;
pub use spaces::MemSpaceRepository;

/// Aggregate handle over every repository plus the task queue.
///
/// Cloning is cheap: each field is an `Arc`-backed handle sharing the same
/// underlying state.
#[derive(Clone, Default)]
pub struct Store {
    /// Space repository.
    pub spaces: MemSpaceRepository,
    /// Document metadata repository.
    pub documents: MemDocumentRepository,
    /// Folder repository.
    pub folders: MemFolderRepository,
    /// Per-user activity repository.
    pub activity: MemActivityRepository,
    /// Consistency task queue.
    pub queue: MemTaskQueue,
}

impl Store {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hierarchy manager over this store's folders and documents.
    pub fn hierarchy(&self) -> HierarchyManager<MemFolderRepository, MemDocumentRepository> {
        HierarchyManager::new(self.folders.clone(), self.documents.clone())
    }
}
