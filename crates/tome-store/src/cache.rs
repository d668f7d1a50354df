//! In-process TTL cache store.
//!
//! Entries carry an absolute expiry and answer as a miss once past it;
//! expired entries are evicted lazily on access. A `disabled()` constructor
//! exists for tests and for running without a cache — the engine must behave
//! identically (only slower) with the cache off.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;
// tokio's Instant (not std's) so tests can drive expiry with a paused clock.
use tokio::time::Instant;
use tracing::debug;

use tome_core::{CacheStore, Result};

struct Entry {
    value: String,
    expires_at: Instant,
}

/// In-memory implementation of [`CacheStore`].
#[derive(Clone)]
pub struct MemoryCache {
    inner: Arc<RwLock<HashMap<String, Entry>>>,
    enabled: bool,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCache {
    /// Create an enabled cache.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            enabled: true,
        }
    }

    /// Create a disabled cache: every get misses, every put is dropped.
    pub fn disabled() -> Self {
        Self {
            inner: Arc::new(RwLock::new(HashMap::new())),
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of live (non-expired) entries.
    pub async fn len(&self) -> usize {
        let now = Instant::now();
        self.inner
            .read()
            .await
            .values()
            .filter(|e| e.expires_at > now)
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        if !self.enabled {
            return Ok(None);
        }
        // Fast path under the read lock.
        {
            let entries = self.inner.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > Instant::now() => {
                    debug!(cache_key = %key, "cache hit");
                    return Ok(Some(entry.value.clone()));
                }
                Some(_) => {}
                None => {
                    debug!(cache_key = %key, "cache miss");
                    return Ok(None);
                }
            }
        }
        // Expired: evict lazily.
        self.inner.write().await.remove(key);
        debug!(cache_key = %key, "cache expired");
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl_secs: u64) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }
        let entry = Entry {
            value,
            expires_at: Instant::now() + Duration::from_secs(ttl_secs),
        };
        self.inner.write().await.insert(key.to_string(), entry);
        debug!(cache_key = %key, ttl_secs, "cache put");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.write().await.remove(key);
        debug!(cache_key = %key, "cache delete");
        Ok(())
    }
}
