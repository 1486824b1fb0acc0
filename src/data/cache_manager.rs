//! Task-level operations over a [`CacheStore`].
//!
//! Each task lives under its own key, `task:<id>`, as a field map.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use super::codec::{decode_task, encode_task};
use super::sort::{paginate, sort_tasks};
use super::CacheStore;
use crate::error::StoreError;
use crate::models::{ListQuery, Task};

/// Glob matching every task key
pub const TASK_KEY_PATTERN: &str = "task:*";

pub fn task_key(id: u64) -> String {
    format!("task:{}", id)
}

/// One page listed from the cache.
#[derive(Debug, Default)]
pub struct CachedPage {
    pub tasks: Vec<Task>,
    /// Entries that failed to decode and were left out
    pub dropped: usize,
}

/// Cache access in terms of tasks rather than keys and field maps.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Lists every cached task, orders it as requested and cuts the page.
    /// Entries that do not decode are dropped and counted.
    pub async fn list_tasks(&self, query: &ListQuery) -> Result<CachedPage, StoreError> {
        let keys = self.store.keys(TASK_KEY_PATTERN).await?;

        let mut tasks = Vec::with_capacity(keys.len());
        let mut dropped = 0;
        for key in keys {
            let fields = self.store.get_fields(&key).await?;
            // Expired or removed since enumeration
            if fields.is_empty() {
                continue;
            }
            match decode_task(&fields) {
                Ok(task) => tasks.push(task),
                Err(e) => {
                    warn!(key = %key, error = %e, "Dropping undecodable cache entry");
                    dropped += 1;
                }
            }
        }

        sort_tasks(&mut tasks, &query.order);

        Ok(CachedPage {
            tasks: paginate(tasks, query.limit, query.offset),
            dropped,
        })
    }

    /// `Ok(None)` on a miss.
    pub async fn get_task(&self, id: u64) -> Result<Option<Task>, StoreError> {
        let fields = self.store.get_fields(&task_key(id)).await?;
        if fields.is_empty() {
            return Ok(None);
        }
        decode_task(&fields).map(Some)
    }

    pub async fn put_task(&self, task: &Task) -> Result<(), StoreError> {
        self.store
            .set_fields(&task_key(task.id), encode_task(task))
            .await
    }

    pub async fn delete_task(&self, id: u64) -> Result<(), StoreError> {
        self.store.delete_fields(&task_key(id)).await
    }

    /// Makes the cached task set equal to `tasks`: writes every task, then
    /// removes keys of tasks that are no longer present.
    pub async fn replace_all(&self, tasks: &[Task]) -> Result<(), StoreError> {
        for task in tasks {
            self.put_task(task).await?;
        }

        let live: HashSet<String> = tasks.iter().map(|t| task_key(t.id)).collect();
        for key in self.store.keys(TASK_KEY_PATTERN).await? {
            if !live.contains(&key) {
                self.store.delete_fields(&key).await?;
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::models::OrderSpec;
    use chrono::Utc;
    use tokio::sync::RwLock;

    fn manager() -> (CacheManager, Arc<RwLock<MemoryCache>>) {
        let cache = Arc::new(RwLock::new(MemoryCache::new(100)));
        (CacheManager::new(cache.clone()), cache)
    }

    fn task(id: u64, name: &str) -> Task {
        let now = Utc::now();
        Task {
            id,
            name: name.to_string(),
            content: String::new(),
            tag: None,
            status: 1,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_get_miss_is_none() {
        let (mgr, _) = manager();
        assert!(mgr.get_task(9).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let (mgr, _) = manager();
        let t = task(1, "one");
        mgr.put_task(&t).await.unwrap();
        assert_eq!(mgr.get_task(1).await.unwrap(), Some(t));
    }

    #[tokio::test]
    async fn test_list_sorts_and_pages() {
        let (mgr, _) = manager();
        for id in 1..=5 {
            mgr.put_task(&task(id, &format!("n{}", id))).await.unwrap();
        }

        let page = mgr
            .list_tasks(&ListQuery::new(2, 1, OrderSpec::default()))
            .await
            .unwrap();
        let ids: Vec<u64> = page.tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![4, 3]);
        assert_eq!(page.dropped, 0);
    }

    #[tokio::test]
    async fn test_list_drops_undecodable_entries() {
        let (mgr, cache) = manager();
        mgr.put_task(&task(1, "good")).await.unwrap();

        let mut broken = encode_task(&task(2, "bad"));
        broken.insert("version".to_string(), "not-a-number".to_string());
        cache
            .write()
            .await
            .set_fields(task_key(2), broken)
            .unwrap();

        let page = mgr
            .list_tasks(&ListQuery::new(20, 0, OrderSpec::default()))
            .await
            .unwrap();
        assert_eq!(page.tasks.len(), 1);
        assert_eq!(page.dropped, 1);
    }

    #[tokio::test]
    async fn test_replace_all_removes_stale_keys() {
        let (mgr, _) = manager();
        mgr.put_task(&task(1, "gone")).await.unwrap();
        mgr.put_task(&task(2, "kept")).await.unwrap();

        mgr.replace_all(&[task(2, "kept"), task(3, "new")]).await.unwrap();

        assert!(mgr.get_task(1).await.unwrap().is_none());
        assert!(mgr.get_task(2).await.unwrap().is_some());
        assert!(mgr.get_task(3).await.unwrap().is_some());
    }
}
