//! Per-user activity repository implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use tome_core::defaults::RECENT_MAX_ENTRIES;
use tome_core::{ActivityRepository, RecentEntry, Result, StarredEntry, UserActivity};

/// In-memory implementation of [`ActivityRepository`].
#[derive(Clone, Default)]
pub struct MemActivityRepository {
    inner: Arc<RwLock<HashMap<String, UserActivity>>>,
}

impl MemActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityRepository for MemActivityRepository {
    async fn record_visit(&self, user_id: &str, entry: RecentEntry) -> Result<()> {
        let mut users = self.inner.write().await;
        let activity = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserActivity {
                user_id: user_id.to_string(),
                ..Default::default()
            });

        // Dedupe by (path, space): a revisit moves the entry to the front.
        activity
            .recent
            .retain(|e| !(e.path == entry.path && e.space_name == entry.space_name));
        activity.recent.insert(0, entry);
        activity.recent.truncate(RECENT_MAX_ENTRIES);
        Ok(())
    }

    async fn toggle_star(&self, user_id: &str, entry: StarredEntry) -> Result<bool> {
        let mut users = self.inner.write().await;
        let activity = users
            .entry(user_id.to_string())
            .or_insert_with(|| UserActivity {
                user_id: user_id.to_string(),
                ..Default::default()
            });

        let before = activity.starred.len();
        activity
            .starred
            .retain(|e| !(e.path == entry.path && e.space_name == entry.space_name));
        if activity.starred.len() == before {
            activity.starred.insert(0, entry);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    async fn get(&self, user_id: &str) -> Result<UserActivity> {
        Ok(self
            .inner
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| UserActivity {
                user_id: user_id.to_string(),
                ..Default::default()
            }))
    }
}
