//! Read path: cache first when trusted, primary store otherwise.
//!
//! A cache miss or cache failure is never an error here; it only routes the
//! read to the primary store.

use tracing::{debug, info, warn};

use super::Coordinator;
use crate::error::Result;
use crate::models::{ListQuery, OrderSpec, Task};

impl Coordinator {
    // == Get ==
    /// Fetches one task by id.
    pub async fn get(&self, id: u64) -> Result<Task> {
        self.exclusive("get", self.get_locked(id)).await
    }

    async fn get_locked(&self, id: u64) -> Result<Task> {
        if self.health.get_enabled() {
            match self.cache.get_task(id).await {
                Ok(Some(task)) => {
                    debug!(task_id = id, "Served from cache");
                    return Ok(task);
                }
                Ok(None) => debug!(task_id = id, "Cache miss"),
                Err(e) => warn!(task_id = id, error = %e, "Cache read failed, using primary"),
            }
        }

        let task = self.primary.get_by_id(id).await?;
        self.read_through(&task).await;
        Ok(task)
    }

    /// Best-effort populate after a primary read. A failed populate is
    /// logged and the possibly stale entry is evicted.
    async fn read_through(&self, task: &Task) {
        match self.cache.put_task(task).await {
            Ok(()) => {
                if self.reconciler.verify(task.id, task.version).await {
                    self.health.enable_get_if_clean();
                }
            }
            Err(e) => {
                warn!(task_id = task.id, error = %e, "Cache populate failed");
                self.health.disable_list();
                self.reconciler.evict(task.id).await;
            }
        }
    }

    // == List ==
    /// One ordered page of tasks.
    pub async fn list(&self, query: ListQuery) -> Result<Vec<Task>> {
        self.exclusive("list", self.list_locked(query)).await
    }

    async fn list_locked(&self, query: ListQuery) -> Result<Vec<Task>> {
        if self.health.list_enabled() {
            match self.cache.list_tasks(&query).await {
                Ok(page) if page.dropped > 0 => {
                    warn!(dropped = page.dropped, "Cache holds undecodable entries");
                    self.health.disable_list();
                }
                Ok(page) if !page.tasks.is_empty() => {
                    debug!(count = page.tasks.len(), "Page served from cache");
                    return Ok(page.tasks);
                }
                Ok(_) => debug!("Cache page empty, using primary"),
                Err(e) => {
                    warn!(error = %e, "Cache list failed, using primary");
                    self.health.disable_list();
                }
            }
        }

        let tasks = self
            .primary
            .list(Some(query.limit), query.offset, &query.order)
            .await?;

        if !self.health.list_enabled() {
            self.resync().await;
        }

        Ok(tasks)
    }

    /// Rebuilds the cache from the full primary table. On success both cache
    /// paths are back in service.
    async fn resync(&self) {
        let all = match self.primary.list(None, 0, &OrderSpec::default()).await {
            Ok(all) => all,
            Err(e) => {
                warn!(error = %e, "Resync skipped, primary list failed");
                return;
            }
        };

        match self.cache.replace_all(&all).await {
            Ok(()) => {
                info!(count = all.len(), "Cache resynced from primary");
                self.health.enable_all();
            }
            Err(e) => warn!(error = %e, "Cache resync failed"),
        }
    }
}
