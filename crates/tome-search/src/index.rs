//! Immutable inverted-index snapshot.
//!
//! A snapshot is built once and never mutated; "updates" clone the current
//! snapshot, apply the change, and publish the result. That keeps query
//! reads lock-free apart from grabbing the current `Arc`.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use tome_core::file_types::extension_of;
use tome_core::{tokenize, Document, FileCategory, IndexStats};

/// Per-token posting: term frequencies split by field so the ranking
/// formula can weight them differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posting {
    pub document_id: Uuid,
    pub title_tf: u32,
    pub meta_tf: u32,
    pub body_tf: u32,
}

/// Indexed metadata kept alongside the postings so hits can be rendered
/// without a store round-trip.
#[derive(Debug, Clone)]
pub struct IndexedDocument {
    pub id: Uuid,
    pub title: String,
    pub excerpt: String,
    pub space_name: String,
    pub folder_path: String,
    pub tags: Vec<String>,
    pub file_type: String,
    pub base_type: String,
    pub modified_at: DateTime<Utc>,
    pub content_path: String,
}

impl IndexedDocument {
    pub fn from_document(doc: &Document) -> Self {
        let file_type = {
            let ext = extension_of(&doc.content_path);
            if ext.is_empty() {
                "md".to_string()
            } else {
                ext
            }
        };
        Self {
            id: doc.id,
            title: doc.title.clone(),
            excerpt: doc.excerpt.clone(),
            space_name: doc.space_name.clone(),
            folder_path: doc.folder_path.clone(),
            tags: doc.tags.clone(),
            file_type,
            base_type: FileCategory::Document.as_str().to_string(),
            modified_at: doc.modified_at,
            content_path: doc.content_path.clone(),
        }
    }
}

/// One generation of the inverted index.
///
/// Tokens map to postings sorted by document id; the vocabulary is a
/// `BTreeMap` so prefix suggestions are a range scan.
#[derive(Debug, Clone, Default)]
pub struct IndexSnapshot {
    postings: BTreeMap<String, Vec<Posting>>,
    documents: HashMap<Uuid, IndexedDocument>,
    built_at: Option<DateTime<Utc>>,
}

impl IndexSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add (or replace) one document's postings.
    pub fn upsert(&mut self, doc: &Document, content: &str) {
        self.remove(doc.id);

        let mut tfs: HashMap<String, Posting> = HashMap::new();
        let mut bump = |tokens: Vec<String>, field: Field| {
            for token in tokens {
                let posting = tfs.entry(token).or_insert(Posting {
                    document_id: doc.id,
                    title_tf: 0,
                    meta_tf: 0,
                    body_tf: 0,
                });
                match field {
                    Field::Title => posting.title_tf += 1,
                    Field::Meta => posting.meta_tf += 1,
                    Field::Body => posting.body_tf += 1,
                }
            }
        };

        bump(tokenize(&doc.title), Field::Title);
        bump(tokenize(&doc.excerpt), Field::Meta);
        for tag in &doc.tags {
            bump(tokenize(tag), Field::Meta);
        }
        bump(tokenize(content), Field::Body);

        for (token, posting) in tfs {
            let list = self.postings.entry(token).or_default();
            let pos = list
                .binary_search_by(|p| p.document_id.cmp(&doc.id))
                .unwrap_or_else(|i| i);
            list.insert(pos, posting);
        }
        self.documents.insert(doc.id, IndexedDocument::from_document(doc));
    }

    /// Drop one document's postings. Tokens left with no postings are
    /// removed from the vocabulary.
    pub fn remove(&mut self, document_id: Uuid) {
        if self.documents.remove(&document_id).is_none() {
            return;
        }
        self.postings.retain(|_, list| {
            list.retain(|p| p.document_id != document_id);
            !list.is_empty()
        });
    }

    /// Mark the snapshot as a completed build.
    pub fn finish_build(&mut self) {
        self.built_at = Some(Utc::now());
    }

    pub fn postings_for(&self, token: &str) -> Option<&[Posting]> {
        self.postings.get(token).map(Vec::as_slice)
    }

    pub fn document(&self, id: Uuid) -> Option<&IndexedDocument> {
        self.documents.get(&id)
    }

    pub fn documents(&self) -> impl Iterator<Item = &IndexedDocument> {
        self.documents.values()
    }

    /// Vocabulary tokens starting with `prefix`, in lexicographic order.
    pub fn tokens_with_prefix<'a>(
        &'a self,
        prefix: &'a str,
    ) -> impl Iterator<Item = &'a str> + 'a {
        self.postings
            .range(prefix.to_string()..)
            .take_while(move |(token, _)| token.starts_with(prefix))
            .map(|(token, _)| token.as_str())
    }

    pub fn stats(&self) -> IndexStats {
        IndexStats {
            document_count: self.documents.len(),
            token_count: self.postings.len(),
            last_built: self.built_at,
        }
    }
}

#[derive(Clone, Copy)]
enum Field {
    Title,
    Meta,
    Body,
}
