//! Structured logging field name constants for the tome system.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, cache hits/misses, config choices |
//! | TRACE | Per-item iteration, high-volume data (postings, hits) |

/// Subsystem originating the log event.
/// Values: "api", "search", "store", "jobs"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "search", "rebuild", "dispatch", "tree"
pub const OPERATION: &str = "op";

/// Document UUID being operated on.
pub const DOCUMENT_ID: &str = "document_id";

/// Space UUID being operated on.
pub const SPACE_ID: &str = "space_id";

/// Task variant being processed.
pub const TASK_KIND: &str = "task_kind";

/// Search query text.
pub const QUERY: &str = "query";

/// Cache key touched by a get/put/delete.
pub const CACHE_KEY: &str = "cache_key";

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search or listing.
pub const RESULT_COUNT: &str = "result_count";

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
