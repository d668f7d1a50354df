//! # tome-search
//!
//! Hand-rolled inverted-index search for the tome content engine.
//!
//! The index is an immutable snapshot behind an atomic pointer: queries read
//! whichever snapshot is current, rebuilds construct a fresh one off to the
//! side and swap the pointer. The query path never observes a partially
//! built index.
//!
//! Ranking is field-weighted term frequency (title 3, excerpt/tags 2,
//! body 1), averaged over the query token count so longer queries don't
//! trivially outscore shorter ones. When the index has no answer, the engine
//! falls back to a direct substring scan over document metadata so search
//! keeps returning results mid-rebuild.

pub mod engine;
pub mod index;

pub use engine::{SearchEngine, SearchRequest};
pub use index::IndexSnapshot;
