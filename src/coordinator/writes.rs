//! Write path: primary store first, then mirror into the cache and verify.

use chrono::Utc;
use tracing::{error, info, warn};

use super::health::PendingWrite;
use super::Coordinator;
use crate::error::{Result, ServiceError, StoreError};
use crate::models::{Task, TaskDraft};

impl Coordinator {
    // == Create ==
    /// Inserts a task unless one with the same name (and tag, when given)
    /// exists.
    pub async fn create(&self, draft: TaskDraft) -> Result<Task> {
        self.exclusive("create", async {
            let pending = PendingWrite::arm(&self.health);
            let result = self.create_locked(&draft).await;
            pending.complete();
            result
        })
        .await
    }

    async fn create_locked(&self, draft: &TaskDraft) -> Result<Task> {
        if let Some(existing) = self.primary.find_one(&draft.condition()).await? {
            return Err(ServiceError::AlreadyExists(format!(
                "task {} has the same name and tag",
                existing.id
            )));
        }

        let id = self.primary.insert(draft).await?;
        let task = self.primary.get_by_id(id).await?;
        info!(task_id = id, "Task created");

        self.write_through(&task).await;
        Ok(task)
    }

    // == Update ==
    /// Replaces the mutable fields of task `id` and bumps its version.
    pub async fn update(&self, id: u64, draft: TaskDraft) -> Result<Task> {
        self.exclusive("update", async {
            let pending = PendingWrite::arm(&self.health);
            let result = self.update_locked(id, &draft).await;
            pending.complete();
            result
        })
        .await
    }

    async fn update_locked(&self, id: u64, draft: &TaskDraft) -> Result<Task> {
        let mut task = self.primary.get_by_id(id).await?;
        task.apply(draft);
        task.version += 1;
        task.updated_at = Utc::now();

        self.primary.update(&task).await?;
        info!(task_id = id, version = task.version, "Task updated");

        self.write_through(&task).await;
        Ok(task)
    }

    // == Delete ==
    /// Evicts the cache entry, then deletes the primary record.
    pub async fn delete(&self, id: u64) -> Result<()> {
        self.exclusive("delete", async {
            let pending = PendingWrite::arm(&self.health);
            let result = self.delete_locked(id).await;
            pending.complete();
            result
        })
        .await
    }

    async fn delete_locked(&self, id: u64) -> Result<()> {
        if let Err(e) = self.cache.delete_task(id).await {
            error!(task_id = id, error = %e, "Cache eviction before delete failed");
            self.health.disable_all();
            self.health.mark_dirty();
        }

        match self.primary.delete(id).await {
            Ok(()) => {
                info!(task_id = id, "Task deleted");
                Ok(())
            }
            Err(StoreError::RecordNotFound(id)) => Err(ServiceError::NotFound(id)),
            Err(e) => {
                // The record may survive while its cache entry is gone
                self.health.disable_list();
                Err(e.into())
            }
        }
    }

    /// Mirrors a record the primary store just accepted.
    async fn write_through(&self, task: &Task) {
        match self.cache.put_task(task).await {
            Ok(()) => {
                if self.reconciler.verify(task.id, task.version).await {
                    self.health.enable_get_if_clean();
                }
            }
            Err(e) => {
                warn!(task_id = task.id, error = %e, "Write-through failed");
                self.health.disable_all();
                self.reconciler.evict(task.id).await;
            }
        }
    }
}
