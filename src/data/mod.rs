//! Data Module
//!
//! Capability sets of the two backends the coordinator talks to, plus the
//! task-shaped helpers built on top of them.
//!
//! The coordinator is handed one [`PrimaryStore`] and one [`CacheStore`]
//! explicitly; nothing here guesses a backend from a runtime type.

mod cache_manager;
mod codec;
mod lock;
mod memory;
mod sort;
mod sqlite;


use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{OrderSpec, Task, TaskCondition, TaskDraft};

pub use cache_manager::{task_key, CacheManager, CachedPage, TASK_KEY_PATTERN};
pub use codec::{decode_task, encode_task};
pub use lock::{DistributedLock, LockGuard, LOCK_SENTINEL};
pub use memory::MemoryPrimaryStore;
pub use sort::{paginate, sort_tasks};
pub use sqlite::SqlitePrimaryStore;

/// String-encoded field map of one cached record.
pub type FieldMap = HashMap<String, String>;

// == Primary Store ==
/// Durable record repository and source of truth.
#[async_trait]
pub trait PrimaryStore: Send + Sync {
    /// Ordered page of records. `limit: None` returns everything from `offset`.
    async fn list(
        &self,
        limit: Option<usize>,
        offset: usize,
        order: &OrderSpec,
    ) -> Result<Vec<Task>, StoreError>;

    /// Fails with [`StoreError::RecordNotFound`] when absent.
    async fn get_by_id(&self, id: u64) -> Result<Task, StoreError>;

    /// First record matching `condition`, if any.
    async fn find_one(&self, condition: &TaskCondition) -> Result<Option<Task>, StoreError>;

    /// Inserts a record; the store assigns id, version and timestamps.
    /// Returns the assigned id.
    async fn insert(&self, draft: &TaskDraft) -> Result<u64, StoreError>;

    /// Overwrites an existing record as given.
    async fn update(&self, task: &Task) -> Result<(), StoreError>;

    async fn delete(&self, id: u64) -> Result<(), StoreError>;

    async fn close(&self);
}

// == Cache Store ==
/// Volatile key space with field-map values and key enumeration.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Keys matching a glob pattern (`*`, `?`).
    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StoreError>;

    /// Field map under `key`; empty when the key is absent.
    async fn get_fields(&self, key: &str) -> Result<FieldMap, StoreError>;

    /// Replaces the whole field map under `key` in one step.
    async fn set_fields(&self, key: &str, fields: FieldMap) -> Result<(), StoreError>;

    /// Drops the field map under `key`. Absent keys are not an error.
    async fn delete_fields(&self, key: &str) -> Result<(), StoreError>;

    /// Creates `key` with `value` only if absent. Returns whether this call
    /// created it.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<bool, StoreError>;

    /// Deletes any key. Absent keys are not an error.
    async fn delete(&self, key: &str) -> Result<(), StoreError>;

    async fn close(&self);
}
