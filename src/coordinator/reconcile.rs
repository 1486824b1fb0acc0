//! Version reconciliation.
//!
//! After the coordinator mirrors a record into the cache it reads the entry
//! back and compares versions. A mismatch means something raced the write;
//! the entry is evicted so the next read goes to the primary store.

use std::sync::Arc;

use tracing::{debug, error, warn};

use super::health::CacheHealth;
use crate::data::CacheManager;

#[derive(Clone)]
pub struct VersionReconciler {
    cache: CacheManager,
    health: Arc<CacheHealth>,
}

impl VersionReconciler {
    pub fn new(cache: CacheManager, health: Arc<CacheHealth>) -> Self {
        Self { cache, health }
    }

    /// Returns true when the cached copy of `id` carries `expected_version`.
    /// Anything else evicts the entry and takes the list cache out of
    /// service.
    pub async fn verify(&self, id: u64, expected_version: i64) -> bool {
        let cached = match self.cache.get_task(id).await {
            Ok(Some(task)) if task.version == expected_version => {
                debug!(task_id = id, version = expected_version, "Cached version verified");
                return true;
            }
            Ok(Some(task)) => Some(task.version),
            Ok(None) => None,
            Err(e) => {
                warn!(task_id = id, error = %e, "Version check could not read cache");
                None
            }
        };

        warn!(
            task_id = id,
            expected = expected_version,
            cached = ?cached,
            "Cached version diverged, evicting"
        );
        self.health.disable_list();
        self.evict(id).await;
        false
    }

    /// Removes the cache entry of `id`. If that fails too, the entry may be
    /// stale and gets stay off until a resync.
    pub async fn evict(&self, id: u64) -> bool {
        match self.cache.delete_task(id).await {
            Ok(()) => true,
            Err(e) => {
                error!(task_id = id, error = %e, "Cache eviction failed");
                self.health.disable_get();
                self.health.mark_dirty();
                false
            }
        }
    }
}
