//! Typed read-through cache over the `CacheStore` trait.
//!
//! Every failure is swallowed: a broken cache degrades reads to the store,
//! it never breaks a request. Write paths only delete keys; values are
//! repopulated lazily by the next read.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use tome_core::CacheStore;

/// JSON-typed wrapper over a [`CacheStore`].
#[derive(Clone)]
pub struct ReadCache {
    inner: Arc<dyn CacheStore>,
}

impl ReadCache {
    pub fn new(inner: Arc<dyn CacheStore>) -> Self {
        Self { inner }
    }

    /// Get and deserialize a cached value. Any error is a miss.
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.inner.get(key).await {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => {
                    debug!(cache_key = %key, "Cache hit");
                    Some(value)
                }
                Err(err) => {
                    warn!(cache_key = %key, error = %err, "Cache deserialization failed");
                    None
                }
            },
            Ok(None) => {
                debug!(cache_key = %key, "Cache miss");
                None
            }
            Err(err) => {
                warn!(cache_key = %key, error = %err, "Cache read failed");
                None
            }
        }
    }

    /// Serialize and store a value. Any error is a no-op.
    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T, ttl_secs: u64) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(cache_key = %key, error = %err, "Cache serialization failed");
                return;
            }
        };
        if let Err(err) = self.inner.put(key, raw, ttl_secs).await {
            warn!(cache_key = %key, error = %err, "Cache write failed");
        }
    }

    /// Delete a batch of keys. Errors are logged and ignored.
    pub async fn invalidate(&self, keys: &[String]) {
        for key in keys {
            if let Err(err) = self.inner.delete(key).await {
                warn!(cache_key = %key, error = %err, "Cache invalidation failed");
            }
        }
        debug!(key_count = keys.len(), "Cache keys invalidated");
    }
}
