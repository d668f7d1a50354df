//! # tome-core
//!
//! Core types, traits, and abstractions for the tome content engine.
//!
//! This crate provides the foundational data structures and trait definitions
//! that the other tome crates depend on: the domain models (spaces, folders,
//! documents, activity), the queue task enum, the error type, and the narrow
//! contracts through which the engine consumes its durable, blob, and cache
//! stores.

pub mod cache_keys;
pub mod defaults;
pub mod error;
pub mod excerpt;
pub mod file_types;
pub mod logging;
pub mod models;
pub mod tokenizer;
pub mod traits;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use excerpt::{excerpt_of, slugify};
pub use file_types::{detect_file_metadata, mime_from_extension, FileCategory, FileMetadata};
pub use models::*;
pub use tokenizer::tokenize;
pub use traits::*;
