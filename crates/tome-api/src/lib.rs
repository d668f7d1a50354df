//! # tome-api
//!
//! HTTP API server for the tome content engine: spaces, documents, folder
//! hierarchy, search, and the activity feed, with a read-through cache in
//! front of every list/detail route and a consistency queue behind every
//! write.

pub mod error;
pub mod handlers;
pub mod services;

use std::sync::Arc;
use std::time::Duration;

use axum::http::Method;
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use tome_core::defaults::{CORS_MAX_AGE_SECS, DATA_DIR, SERVER_PORT};
use tome_core::{BlobStore, CacheStore};
use tome_jobs::Dispatcher;
use tome_search::SearchEngine;
use tome_store::Store;

use services::read_cache::ReadCache;

/// Server configuration from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_dir: String,
    pub cache_enabled: bool,
}

impl ServerConfig {
    /// Read configuration from the environment (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `PORT` | `3000` | HTTP listen port |
    /// | `DATA_DIR` | `./data` | Blob store root directory |
    /// | `CACHE_ENABLED` | `true` | Enable the read-through cache |
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse::<u16>().ok())
            .unwrap_or(SERVER_PORT);

        let data_dir = std::env::var("DATA_DIR").unwrap_or_else(|_| DATA_DIR.to_string());

        let cache_enabled = std::env::var("CACHE_ENABLED")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        Self {
            port,
            data_dir,
            cache_enabled,
        }
    }
}

/// Shared application state. Cloning is cheap; everything inside is an
/// `Arc`-backed handle.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub blobs: Arc<dyn BlobStore>,
    pub cache: ReadCache,
    pub engine: Arc<SearchEngine>,
    pub dispatcher: Dispatcher,
}

impl AppState {
    pub fn new(store: Store, blobs: Arc<dyn BlobStore>, cache_store: Arc<dyn CacheStore>) -> Self {
        let engine = Arc::new(SearchEngine::new(
            Arc::new(store.documents.clone()),
            blobs.clone(),
        ));
        let dispatcher = Dispatcher::new(
            Arc::new(store.documents.clone()),
            Arc::new(store.spaces.clone()),
            blobs.clone(),
        );
        Self {
            store,
            blobs,
            cache: ReadCache::new(cache_store),
            engine,
            dispatcher,
        }
    }
}

/// Build the full application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_origin(Any)
        .allow_headers(Any)
        .max_age(Duration::from_secs(CORS_MAX_AGE_SECS));

    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/spaces",
            get(handlers::spaces::list).post(handlers::spaces::create),
        )
        .route("/spaces/:id/documents", get(handlers::spaces::documents))
        .route("/spaces/:id/folders", get(handlers::folders::tree))
        .route("/folders", post(handlers::folders::create))
        .route(
            "/documents",
            get(handlers::documents::list)
                .post(handlers::documents::create)
                .put(handlers::documents::update),
        )
        .route("/documents/recent", get(handlers::documents::recent))
        .route("/documents/popular", get(handlers::documents::popular))
        .route(
            "/documents/content",
            get(handlers::content::read).put(handlers::content::write),
        )
        .route("/documents/:id", get(handlers::documents::get_full))
        .route("/documents/:id/move", put(handlers::folders::move_document))
        .route("/documents/:id/star", post(handlers::activity::toggle_star))
        .route("/search", get(handlers::search::query))
        .route("/search/suggestions", get(handlers::search::suggestions))
        .route("/search/stats", get(handlers::search::stats))
        .route("/search/rebuild", post(handlers::search::rebuild))
        .route("/recent", get(handlers::activity::feed))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
