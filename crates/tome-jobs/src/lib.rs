//! # tome-jobs
//!
//! Background worker for the consistency queue.
//!
//! Write paths enqueue small deferred tasks (view-count merges, space
//! document counts, file materialization) instead of doing the work inline.
//! A single periodic worker drains the queue one task per tick and dispatches
//! by task type. Every task is idempotent by construction, so duplicates and
//! replays are harmless.

pub mod dispatch;
pub mod worker;

pub use dispatch::{run_pending, Dispatcher};
pub use worker::{RetryPolicy, Worker, WorkerConfig, WorkerEvent, WorkerHandle};
