//! tome-api - HTTP API server for tome

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tome_api::{app, AppState, ServerConfig};
use tome_jobs::{Worker, WorkerConfig};
use tome_store::{FsBlobStore, MemoryCache, Store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tome_api=info,tome_jobs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env();

    let blobs = Arc::new(FsBlobStore::new(&config.data_dir));
    if let Err(err) = blobs.validate().await {
        anyhow::bail!("blob store validation failed at {}: {err}", config.data_dir);
    }

    let cache = if config.cache_enabled {
        MemoryCache::new()
    } else {
        info!("Read-through cache disabled via CACHE_ENABLED=false");
        MemoryCache::disabled()
    };

    let store = Store::new();
    let state = AppState::new(store.clone(), blobs, Arc::new(cache));

    // Build the index before accepting traffic; later rebuilds are
    // triggered over HTTP.
    state.engine.rebuild().await?;

    let worker = Worker::new(
        Arc::new(store.queue.clone()),
        state.dispatcher.clone(),
        WorkerConfig::from_env(),
    );
    let worker_handle = worker.start();

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, data_dir = %config.data_dir, "tome-api listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutdown signal received");
        })
        .await?;

    worker_handle.shutdown().await.ok();
    Ok(())
}
