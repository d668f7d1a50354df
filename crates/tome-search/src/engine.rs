//! Query engine over the inverted-index snapshot.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use uuid::Uuid;

use tome_core::defaults::{
    SEARCH_MAX_RESULTS, SUGGESTION_LIMIT, WEIGHT_BODY, WEIGHT_META, WEIGHT_TITLE,
};
use tome_core::{
    tokenize, BlobStore, Document, DocumentRepository, IndexStats, Result, SearchHit,
    SearchResponse,
};

use crate::index::{IndexSnapshot, IndexedDocument};

/// A ranked search request.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub query: String,
    pub max_results: usize,
    /// Restrict hits to these file extensions (empty = no restriction).
    pub file_types: Vec<String>,
    /// Restrict hits to these file categories (empty = no restriction).
    pub base_types: Vec<String>,
    /// Load content bodies for the returned hits.
    pub include_content: bool,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            max_results: SEARCH_MAX_RESULTS,
            file_types: Vec::new(),
            base_types: Vec::new(),
            include_content: false,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    pub fn with_file_types(mut self, file_types: Vec<String>) -> Self {
        self.file_types = file_types;
        self
    }

    pub fn with_base_types(mut self, base_types: Vec<String>) -> Self {
        self.base_types = base_types;
        self
    }

    pub fn with_content(mut self, include_content: bool) -> Self {
        self.include_content = include_content;
        self
    }

    fn matches_filters(&self, doc: &IndexedDocument) -> bool {
        (self.file_types.is_empty() || self.file_types.iter().any(|t| *t == doc.file_type))
            && (self.base_types.is_empty() || self.base_types.iter().any(|t| *t == doc.base_type))
    }
}

/// Search engine holding the current index snapshot.
///
/// Queries clone the snapshot `Arc` and compute against it without holding
/// the lock; rebuilds and incremental updates publish a fresh snapshot with
/// a pointer swap. A rebuild racing a query is therefore safe: the query
/// sees either the old or the new index, never a mix.
pub struct SearchEngine {
    snapshot: RwLock<Arc<IndexSnapshot>>,
    documents: Arc<dyn DocumentRepository>,
    blobs: Arc<dyn BlobStore>,
}

impl SearchEngine {
    pub fn new(documents: Arc<dyn DocumentRepository>, blobs: Arc<dyn BlobStore>) -> Self {
        Self {
            snapshot: RwLock::new(Arc::new(IndexSnapshot::empty())),
            documents,
            blobs,
        }
    }

    async fn current(&self) -> Arc<IndexSnapshot> {
        self.snapshot.read().await.clone()
    }

    async fn publish(&self, snapshot: IndexSnapshot) {
        *self.snapshot.write().await = Arc::new(snapshot);
    }

    /// Full rebuild from the document store and blob contents.
    ///
    /// Builds off to the side and swaps at the end, so concurrent queries
    /// keep reading the previous generation. Idempotent.
    pub async fn rebuild(&self) -> Result<IndexStats> {
        let started = std::time::Instant::now();
        let documents = self.documents.list().await?;

        let mut snapshot = IndexSnapshot::empty();
        for doc in &documents {
            let content = match self.blobs.read(&doc.content_path).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(err) => {
                    // A missing blob only costs that document its body
                    // tokens; metadata still gets indexed.
                    warn!(document_id = %doc.id, error = %err, "Blob unreadable during rebuild");
                    String::new()
                }
            };
            snapshot.upsert(doc, &content);
        }
        snapshot.finish_build();

        let stats = snapshot.stats();
        self.publish(snapshot).await;

        info!(
            document_count = stats.document_count,
            token_count = stats.token_count,
            duration_ms = started.elapsed().as_millis() as u64,
            "Search index rebuilt"
        );
        Ok(stats)
    }

    /// Incrementally (re)index one document.
    ///
    /// The write lock is held across the clone-modify-swap: two concurrent
    /// updates cloning the same base snapshot would otherwise drop one
    /// document until the next rebuild.
    pub async fn index_document(&self, doc: &Document, content: &str) {
        let mut guard = self.snapshot.write().await;
        let mut next = (**guard).clone();
        next.upsert(doc, content);
        *guard = Arc::new(next);
        debug!(document_id = %doc.id, "Document indexed");
    }

    /// Remove one document from the index.
    pub async fn remove_document(&self, document_id: Uuid) {
        let mut guard = self.snapshot.write().await;
        let mut next = (**guard).clone();
        next.remove(document_id);
        *guard = Arc::new(next);
    }

    /// Ranked search with substring fallback.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let tokens = tokenize(&request.query);
        if tokens.is_empty() {
            return Ok(SearchResponse {
                hits: Vec::new(),
                total: 0,
                fallback: false,
            });
        }

        let snapshot = self.current().await;
        let mut scores: HashMap<Uuid, f64> = HashMap::new();
        for token in &tokens {
            if let Some(postings) = snapshot.postings_for(token) {
                for posting in postings {
                    let contribution = WEIGHT_TITLE * f64::from(posting.title_tf)
                        + WEIGHT_META * f64::from(posting.meta_tf)
                        + WEIGHT_BODY * f64::from(posting.body_tf);
                    *scores.entry(posting.document_id).or_insert(0.0) += contribution;
                }
            }
        }

        // Average over query tokens so long queries don't outscore short ones.
        let token_count = tokens.len() as f64;
        let mut hits: Vec<SearchHit> = scores
            .into_iter()
            .filter_map(|(id, score)| {
                let doc = snapshot.document(id)?;
                request
                    .matches_filters(doc)
                    .then(|| hit_from_indexed(doc, score / token_count))
            })
            .collect();

        let mut fallback = false;
        if hits.is_empty() {
            hits = self.substring_scan(request, &tokens).await?;
            fallback = !hits.is_empty();
        }

        sort_hits(&mut hits);
        let total = hits.len();
        hits.truncate(request.max_results);

        if request.include_content {
            for hit in &mut hits {
                let path = Document::blob_path(hit.document_id);
                if let Ok(bytes) = self.blobs.read(&path).await {
                    hit.content = Some(String::from_utf8_lossy(&bytes).into_owned());
                }
            }
        }

        debug!(
            query = %request.query,
            result_count = hits.len(),
            fallback,
            "Search complete"
        );
        Ok(SearchResponse {
            total,
            hits,
            fallback,
        })
    }

    /// Substring scan over live document metadata.
    ///
    /// Runs against the store rather than the snapshot so results still
    /// appear before the first build finishes.
    async fn substring_scan(
        &self,
        request: &SearchRequest,
        tokens: &[String],
    ) -> Result<Vec<SearchHit>> {
        let documents = self.documents.list().await?;
        let token_count = tokens.len() as f64;

        let hits = documents
            .iter()
            .filter_map(|doc| {
                let title = doc.title.to_lowercase();
                let excerpt = doc.excerpt.to_lowercase();
                let tags: Vec<String> = doc.tags.iter().map(|t| t.to_lowercase()).collect();

                let mut score = 0.0;
                for token in tokens {
                    if title.contains(token.as_str()) {
                        score += WEIGHT_TITLE;
                    }
                    if excerpt.contains(token.as_str())
                        || tags.iter().any(|t| t.contains(token.as_str()))
                    {
                        score += WEIGHT_META;
                    }
                }
                if score == 0.0 {
                    return None;
                }

                let indexed = IndexedDocument::from_document(doc);
                request
                    .matches_filters(&indexed)
                    .then(|| hit_from_indexed(&indexed, score / token_count))
            })
            .collect();
        Ok(hits)
    }

    /// Prefix suggestions from the index vocabulary, lexicographic order.
    pub async fn suggestions(&self, prefix: &str, limit: Option<usize>) -> Vec<String> {
        let prefix = prefix.trim().to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }
        let snapshot = self.current().await;
        snapshot
            .tokens_with_prefix(&prefix)
            .take(limit.unwrap_or(SUGGESTION_LIMIT))
            .map(str::to_string)
            .collect()
    }

    pub async fn stats(&self) -> IndexStats {
        self.current().await.stats()
    }
}

fn hit_from_indexed(doc: &IndexedDocument, score: f64) -> SearchHit {
    SearchHit {
        document_id: doc.id,
        title: doc.title.clone(),
        excerpt: doc.excerpt.clone(),
        space_name: doc.space_name.clone(),
        folder_path: doc.folder_path.clone(),
        file_type: doc.file_type.clone(),
        base_type: doc.base_type.clone(),
        score,
        modified_at: doc.modified_at,
        content: None,
    }
}

/// Score descending, ties by most recent modification. Deterministic for
/// equal inputs.
fn sort_hits(hits: &mut [SearchHit]) {
    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.modified_at.cmp(&a.modified_at))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use tome_store::{FsBlobStore, MemDocumentRepository};

    struct Fixture {
        engine: SearchEngine,
        documents: MemDocumentRepository,
        blobs: Arc<FsBlobStore>,
        _dir: tempfile::TempDir,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let documents = MemDocumentRepository::new();
        let blobs = Arc::new(FsBlobStore::new(dir.path()));
        let engine = SearchEngine::new(Arc::new(documents.clone()), blobs.clone());
        Fixture {
            engine,
            documents,
            blobs,
            _dir: dir,
        }
    }

    fn doc(title: &str, excerpt: &str, tags: &[&str]) -> Document {
        let id = Uuid::new_v4();
        Document {
            id,
            title: title.to_string(),
            space_id: Uuid::new_v4(),
            space_name: "eng".to_string(),
            folder_path: String::new(),
            excerpt: excerpt.to_string(),
            author: "test".to_string(),
            created_at: Utc::now(),
            modified_at: Utc::now(),
            views: 0,
            last_viewed: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            content_path: Document::blob_path(id),
        }
    }

    async fn seed(fx: &Fixture, doc: &Document, content: &str) {
        fx.documents.insert(doc.clone()).await.unwrap();
        fx.blobs
            .write(&doc.content_path, content.as_bytes())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn empty_query_returns_empty_not_match_all() {
        let fx = fixture();
        seed(&fx, &doc("anything", "", &[]), "body").await;
        fx.engine.rebuild().await.unwrap();

        for query in ["", "   ", "!?"] {
            let response = fx.engine.search(&SearchRequest::new(query)).await.unwrap();
            assert!(response.hits.is_empty(), "query {query:?} should be empty");
            assert!(!response.fallback);
        }
    }

    #[tokio::test]
    async fn title_match_outranks_body_match() {
        let fx = fixture();
        let in_title = doc("kubernetes guide", "", &[]);
        let in_body = doc("misc notes", "", &[]);
        seed(&fx, &in_title, "deployment pipeline").await;
        seed(&fx, &in_body, "kubernetes kubernetes").await;
        fx.engine.rebuild().await.unwrap();

        let response = fx
            .engine
            .search(&SearchRequest::new("kubernetes"))
            .await
            .unwrap();
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.hits[0].document_id, in_title.id);
        // title weight 3 beats body tf 2 at weight 1
        assert!(response.hits[0].score > response.hits[1].score);
    }

    #[tokio::test]
    async fn multi_token_score_is_averaged() {
        let fx = fixture();
        let d = doc("cache layer", "", &[]);
        seed(&fx, &d, "").await;
        fx.engine.rebuild().await.unwrap();

        let single = fx.engine.search(&SearchRequest::new("cache")).await.unwrap();
        let double = fx
            .engine
            .search(&SearchRequest::new("cache layer"))
            .await
            .unwrap();
        // (3 + 0)/1 for one token, (3 + 3)/2 for two: averaging keeps the
        // score flat instead of doubling it.
        assert_eq!(single.hits[0].score, double.hits[0].score);
    }

    #[tokio::test]
    async fn ties_break_by_most_recent_modification() {
        let fx = fixture();
        let mut older = doc("release checklist", "", &[]);
        older.modified_at = Utc::now() - Duration::hours(2);
        let newer = doc("release checklist", "", &[]);
        seed(&fx, &older, "").await;
        seed(&fx, &newer, "").await;
        fx.engine.rebuild().await.unwrap();

        let response = fx
            .engine
            .search(&SearchRequest::new("release"))
            .await
            .unwrap();
        assert_eq!(response.hits[0].document_id, newer.id);
        assert_eq!(response.hits[1].document_id, older.id);
    }

    #[tokio::test]
    async fn substring_fallback_before_first_build() {
        let fx = fixture();
        let d = doc("PostgreSQL tuning", "connection pools", &[]);
        seed(&fx, &d, "").await;
        // No rebuild: primary index is empty.

        let response = fx
            .engine
            .search(&SearchRequest::new("postgresql"))
            .await
            .unwrap();
        assert!(response.fallback);
        assert_eq!(response.hits.len(), 1);
        assert_eq!(response.hits[0].document_id, d.id);
    }

    #[tokio::test]
    async fn fallback_matches_partial_words() {
        let fx = fixture();
        let d = doc("observability", "", &["tracing"]);
        seed(&fx, &d, "").await;
        fx.engine.rebuild().await.unwrap();

        // "observ" is no token in the index, but it is a substring of the
        // title.
        let response = fx.engine.search(&SearchRequest::new("observ")).await.unwrap();
        assert!(response.fallback);
        assert_eq!(response.hits[0].document_id, d.id);
    }

    #[tokio::test]
    async fn include_content_loads_blob_bodies() {
        let fx = fixture();
        let d = doc("runbook", "", &[]);
        seed(&fx, &d, "# Runbook\nsteps").await;
        fx.engine.rebuild().await.unwrap();

        let response = fx
            .engine
            .search(&SearchRequest::new("runbook").with_content(true))
            .await
            .unwrap();
        assert_eq!(
            response.hits[0].content.as_deref(),
            Some("# Runbook\nsteps")
        );
    }

    #[tokio::test]
    async fn base_type_filter_applies() {
        let fx = fixture();
        let d = doc("api design", "", &[]);
        seed(&fx, &d, "").await;
        fx.engine.rebuild().await.unwrap();

        let hit = fx
            .engine
            .search(&SearchRequest::new("api").with_base_types(vec!["document".to_string()]))
            .await
            .unwrap();
        assert_eq!(hit.hits.len(), 1);

        let miss = fx
            .engine
            .search(&SearchRequest::new("api").with_base_types(vec!["image".to_string()]))
            .await
            .unwrap();
        assert!(miss.hits.is_empty());
    }

    #[tokio::test]
    async fn suggestions_are_prefix_matches_in_order() {
        let fx = fixture();
        seed(&fx, &doc("deploy deployment guide", "", &[]), "deprecated").await;
        fx.engine.rebuild().await.unwrap();

        let suggestions = fx.engine.suggestions("dep", None).await;
        assert_eq!(suggestions, vec!["deploy", "deployment", "deprecated"]);
        assert!(fx.engine.suggestions("", None).await.is_empty());
        assert_eq!(fx.engine.suggestions("dep", Some(1)).await.len(), 1);
    }

    #[tokio::test]
    async fn rebuild_is_idempotent_and_updates_stats() {
        let fx = fixture();
        seed(&fx, &doc("alpha beta", "", &[]), "gamma").await;

        let first = fx.engine.rebuild().await.unwrap();
        let second = fx.engine.rebuild().await.unwrap();
        assert_eq!(first.document_count, second.document_count);
        assert_eq!(first.token_count, second.token_count);
        assert!(second.last_built.is_some());
    }

    #[tokio::test]
    async fn queries_survive_concurrent_rebuilds() {
        let fx = fixture();
        let d = doc("concurrency handbook", "", &[]);
        seed(&fx, &d, "locks and queues").await;
        fx.engine.rebuild().await.unwrap();

        let engine = Arc::new(fx.engine);
        let reader = {
            let engine = engine.clone();
            tokio::spawn(async move {
                for _ in 0..50 {
                    let response = engine
                        .search(&SearchRequest::new("concurrency"))
                        .await
                        .unwrap();
                    assert_eq!(response.hits.len(), 1);
                }
            })
        };
        let builder = {
            let engine = engine.clone();
            tokio::spawn(async move {
                for _ in 0..10 {
                    engine.rebuild().await.unwrap();
                }
            })
        };
        reader.await.unwrap();
        builder.await.unwrap();
    }

    #[tokio::test]
    async fn total_counts_matches_beyond_the_page() {
        let fx = fixture();
        for i in 0..5 {
            seed(&fx, &doc(&format!("backup plan {i}"), "", &[]), "").await;
        }
        fx.engine.rebuild().await.unwrap();

        let response = fx
            .engine
            .search(&SearchRequest::new("backup").with_max_results(2))
            .await
            .unwrap();
        assert_eq!(response.hits.len(), 2);
        assert_eq!(response.total, 5);
    }

    #[tokio::test]
    async fn concurrent_incremental_updates_are_all_retained() {
        let fx = fixture();
        fx.engine.rebuild().await.unwrap();
        let engine = Arc::new(fx.engine);

        let mut handles = Vec::new();
        for i in 0..20 {
            let engine = engine.clone();
            let d = doc(&format!("page {i}"), "", &[]);
            handles.push(tokio::spawn(async move {
                engine.index_document(&d, "shared body").await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        // Every update must survive; a clone taken outside the write lock
        // would let one publish overwrite another.
        assert_eq!(engine.stats().await.document_count, 20);
    }

    #[tokio::test]
    async fn incremental_index_and_remove() {
        let fx = fixture();
        fx.engine.rebuild().await.unwrap();

        let d = doc("fresh page", "", &[]);
        fx.engine.index_document(&d, "brand new body").await;
        let found = fx.engine.search(&SearchRequest::new("fresh")).await.unwrap();
        assert_eq!(found.hits.len(), 1);
        assert!(!found.fallback);

        fx.engine.remove_document(d.id).await;
        let gone = fx.engine.search(&SearchRequest::new("fresh")).await.unwrap();
        assert!(gone.hits.is_empty());
    }
}
