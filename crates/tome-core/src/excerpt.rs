//! Excerpt derivation and path slugs.
//!
//! Excerpts are derived from document content at write time: markdown
//! punctuation is stripped, whitespace collapsed, and the result truncated to
//! [`defaults::EXCERPT_LENGTH`] characters so metadata listings never read
//! file bodies.
//!
//! [`defaults::EXCERPT_LENGTH`]: crate::defaults::EXCERPT_LENGTH

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::EXCERPT_LENGTH;

/// Markdown link syntax: keep the link text, drop the target.
static MD_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").unwrap());

/// Leading heading/blockquote/list markers at line start.
static MD_LINE_MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(#{1,6}\s+|>\s+|[-*+]\s+|\d+\.\s+)").unwrap());

/// Emphasis, inline code, and fence characters.
static MD_INLINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*_`~]+").unwrap());

/// Runs of whitespace (including newlines).
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Derive a plain-text excerpt from markdown content.
pub fn excerpt_of(content: &str) -> String {
    let text = MD_LINK.replace_all(content, "$1");
    let text = MD_LINE_MARKER.replace_all(&text, "");
    let text = MD_INLINE.replace_all(&text, "");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    truncate_chars(text, EXCERPT_LENGTH)
}

/// Truncate to at most `max` characters on a char boundary.
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].trim_end().to_string(),
        None => text.to_string(),
    }
}

/// Turn a folder name into a path segment slug: lowercase alphanumeric runs
/// joined by single hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_hyphen = true;
    for c in name.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}
