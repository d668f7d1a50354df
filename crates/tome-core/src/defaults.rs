//! Centralized default constants for the tome system.
//!
//! **This module is the single source of truth** for all shared default
//! values. All crates should reference these constants instead of defining
//! their own magic numbers.
//!
//! Organized by domain area. When adding new constants, place them in the
//! appropriate section and document the rationale for the chosen value.

// =============================================================================
// CACHE
// =============================================================================

/// TTL for cached list views (spaces, document lists, trees) in seconds.
pub const CACHE_TTL_LIST_SECS: u64 = 300;

/// TTL for cached detail views (full document with content) in seconds.
pub const CACHE_TTL_DETAIL_SECS: u64 = 600;

/// TTL for popularity aggregates. Longer-lived than plain lists because they
/// are more expensive to recompute and less volatile.
pub const CACHE_TTL_POPULAR_SECS: u64 = 600;

// =============================================================================
// SEARCH
// =============================================================================

/// Minimum token length admitted into the inverted index.
pub const MIN_TOKEN_LEN: usize = 2;

/// Score weight for a query token matching the document title.
pub const WEIGHT_TITLE: f64 = 3.0;

/// Score weight for a match in the excerpt or tags.
pub const WEIGHT_META: f64 = 2.0;

/// Score weight for a match in the content body.
pub const WEIGHT_BODY: f64 = 1.0;

/// Default maximum number of search results.
pub const SEARCH_MAX_RESULTS: usize = 50;

/// Default number of prefix suggestions returned.
pub const SUGGESTION_LIMIT: usize = 10;

// =============================================================================
// DOCUMENTS
// =============================================================================

/// Excerpt length in characters (markdown stripped, truncated on a char
/// boundary).
pub const EXCERPT_LENGTH: usize = 150;

/// Blob path prefix for id-addressed document content.
pub const DOCUMENT_BLOB_PREFIX: &str = "documents";

// =============================================================================
// ACTIVITY
// =============================================================================

/// Maximum entries kept in a user's recent-visit list.
pub const RECENT_MAX_ENTRIES: usize = 20;

/// User id attributed to all activity. Authentication is out of scope, so
/// the engine tracks one shared activity feed.
pub const DEFAULT_USER: &str = "default";

// =============================================================================
// WORKER
// =============================================================================

/// Consistency worker tick interval in milliseconds. The worker drains at
/// most one task per tick.
pub const WORKER_TICK_MS: u64 = 5_000;

/// Timeout for a single consistency task in seconds.
pub const TASK_TIMEOUT_SECS: u64 = 30;

/// Default worker event channel capacity.
pub const WORKER_EVENT_CAPACITY: usize = 64;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3000;

/// Default data directory for the blob store.
pub const DATA_DIR: &str = "./data";

/// Default CORS max-age in seconds (1 hour).
pub const CORS_MAX_AGE_SECS: u64 = 3600;
