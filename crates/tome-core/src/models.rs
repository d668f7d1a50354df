//! Core data models for the tome content engine.
//!
//! These types are shared across all tome crates and represent the core
//! domain entities: spaces, folders, documents, user activity, search
//! results, and the consistency queue's task enum.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// SPACE TYPES
// =============================================================================

/// Visibility of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Public,
    #[default]
    Team,
    Private,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Team => "team",
            Visibility::Private => "private",
        }
    }

    /// Parse from a wire string, defaulting to `Team` for unknown values.
    pub fn parse(s: &str) -> Self {
        match s {
            "public" => Visibility::Public,
            "private" => Visibility::Private,
            _ => Visibility::Team,
        }
    }
}

/// A top-level content container holding folders and documents.
///
/// `document_count` is a derived, eventually-consistent counter maintained by
/// the queue worker. It is never computed synchronously on the write path.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Space {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub visibility: Visibility,
    pub document_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub author: String,
}

// =============================================================================
// FOLDER / DOCUMENT TYPES
// =============================================================================

/// A folder within a space's hierarchy.
///
/// `path` is a `/`-joined slug unique within the space. `parent_path` is the
/// path of the containing folder, or the empty string for root-level folders.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: Uuid,
    pub space_id: Uuid,
    pub name: String,
    pub path: String,
    pub parent_path: String,
}

/// Document metadata.
///
/// Content is not inline: `content_path` points into the blob store, so
/// metadata listings never read file bodies. `views` and `last_viewed` are
/// mutated asynchronously by the queue worker only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub space_id: Uuid,
    pub space_name: String,
    pub folder_path: String,
    pub excerpt: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
    pub views: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_viewed: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub content_path: String,
}

impl Document {
    /// Canonical id-addressed blob path for a document's content.
    pub fn blob_path(id: Uuid) -> String {
        format!("{}/{}.md", crate::defaults::DOCUMENT_BLOB_PREFIX, id)
    }
}

/// A document together with its content body (detail view).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentFull {
    #[serde(flatten)]
    pub document: Document,
    pub content: String,
}

/// A node in a space's folder/document forest.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TreeNode {
    Folder {
        folder: Folder,
        children: Vec<TreeNode>,
    },
    Document(Document),
}

impl TreeNode {
    /// Display name used for sibling ordering.
    pub fn name(&self) -> &str {
        match self {
            TreeNode::Folder { folder, .. } => &folder.name,
            TreeNode::Document(doc) => &doc.title,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, TreeNode::Folder { .. })
    }
}

// =============================================================================
// USER ACTIVITY
// =============================================================================

/// A starred document reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StarredEntry {
    pub path: String,
    pub space_name: String,
    pub title: String,
    pub starred_at: DateTime<Utc>,
}

/// A recent-visit entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentEntry {
    pub path: String,
    pub space_name: String,
    pub title: String,
    pub action: String,
    pub visited_at: DateTime<Utc>,
}

/// Per-user activity: starred documents plus a bounded, deduplicated
/// recent-visit list (most recent first, max
/// [`defaults::RECENT_MAX_ENTRIES`](crate::defaults::RECENT_MAX_ENTRIES)).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub user_id: String,
    pub starred: Vec<StarredEntry>,
    pub recent: Vec<RecentEntry>,
}

// =============================================================================
// CONSISTENCY QUEUE TASKS
// =============================================================================

/// A deferred side-effect task for the consistency queue.
///
/// Tasks are immutable once enqueued, consumed at most once by the worker,
/// and processed strictly FIFO. Every variant is idempotent by construction:
/// counts are recomputed, metadata is merged from absolute values, file
/// materialization is skipped when the blob already exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Task {
    /// Merge view stats into the stored document record.
    UpdateDocumentMetadata {
        document_id: Uuid,
        views: i64,
        last_viewed: DateTime<Utc>,
    },
    /// Recompute a space's document count and write it back.
    UpdateSpaceDocumentCount { space_id: Uuid },
    /// Materialize default content for a document referenced before its file
    /// existed.
    CreateDocumentFile {
        document_id: Uuid,
        path: String,
        title: String,
    },
}

impl Task {
    /// Short variant name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Task::UpdateDocumentMetadata { .. } => "updateDocumentMetadata",
            Task::UpdateSpaceDocumentCount { .. } => "updateSpaceDocumentCount",
            Task::CreateDocumentFile { .. } => "createDocumentFile",
        }
    }
}

// =============================================================================
// SEARCH TYPES
// =============================================================================

/// A single ranked search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub document_id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub space_name: String,
    pub folder_path: String,
    pub file_type: String,
    pub base_type: String,
    pub score: f64,
    pub modified_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Response for a ranked search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub hits: Vec<SearchHit>,
    pub total: usize,
    /// True when the primary index produced nothing and the substring scan
    /// supplied the results.
    pub fallback: bool,
}

/// Search index statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub document_count: usize,
    pub token_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_built: Option<DateTime<Utc>>,
}
