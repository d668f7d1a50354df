//! Tokenization for the inverted index.
//!
//! The indexing and query paths must split text identically, so this is the
//! single tokenizer used by both: lowercase, split on non-alphanumeric
//! boundaries, drop tokens shorter than [`defaults::MIN_TOKEN_LEN`].
//!
//! [`defaults::MIN_TOKEN_LEN`]: crate::defaults::MIN_TOKEN_LEN

use crate::defaults::MIN_TOKEN_LEN;

/// Split text into index tokens.
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() >= MIN_TOKEN_LEN)
        .map(str::to_string)
        .collect()
}
