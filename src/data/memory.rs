//! In-process primary store.
//!
//! Every call is atomic under one write lock. Used when no `DATABASE_URL` is
//! configured and as the primary in tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;

use super::sort::{paginate, sort_tasks};
use super::PrimaryStore;
use crate::error::StoreError;
use crate::models::{OrderSpec, SortField, Task, TaskCondition, TaskDraft};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<u64, Task>,
    last_id: u64,
}

#[derive(Debug, Default)]
pub struct MemoryPrimaryStore {
    table: RwLock<Table>,
    closed: AtomicBool,
}

impl MemoryPrimaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored rows.
    pub async fn len(&self) -> usize {
        self.table.read().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn ensure_open(&self) -> Result<(), StoreError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(StoreError::Unavailable("primary store is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PrimaryStore for MemoryPrimaryStore {
    async fn list(
        &self,
        limit: Option<usize>,
        offset: usize,
        order: &OrderSpec,
    ) -> Result<Vec<Task>, StoreError> {
        self.ensure_open()?;
        let mut tasks: Vec<Task> = self.table.read().await.rows.values().cloned().collect();

        // Same fallback as the SQL backend: unknown fields order by id
        let order = OrderSpec {
            field: order.field.or(Some(SortField::Id)),
            direction: order.direction,
        };
        sort_tasks(&mut tasks, &order);

        let limit = limit.unwrap_or(usize::MAX);
        Ok(paginate(tasks, limit, offset))
    }

    async fn get_by_id(&self, id: u64) -> Result<Task, StoreError> {
        self.ensure_open()?;
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or(StoreError::RecordNotFound(id))
    }

    async fn find_one(&self, condition: &TaskCondition) -> Result<Option<Task>, StoreError> {
        self.ensure_open()?;
        Ok(self
            .table
            .read()
            .await
            .rows
            .values()
            .find(|task| condition.matches(task))
            .cloned())
    }

    async fn insert(&self, draft: &TaskDraft) -> Result<u64, StoreError> {
        self.ensure_open()?;
        let mut table = self.table.write().await;
        table.last_id += 1;
        let id = table.last_id;

        let now = Utc::now();
        table.rows.insert(
            id,
            Task {
                id,
                name: draft.name.clone(),
                content: draft.content.clone(),
                tag: draft.tag.clone(),
                status: draft.status,
                version: 1,
                created_at: now,
                updated_at: now,
            },
        );

        Ok(id)
    }

    async fn update(&self, task: &Task) -> Result<(), StoreError> {
        self.ensure_open()?;
        let mut table = self.table.write().await;
        match table.rows.get_mut(&task.id) {
            Some(row) => {
                *row = task.clone();
                Ok(())
            }
            None => Err(StoreError::RecordNotFound(task.id)),
        }
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        self.ensure_open()?;
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::RecordNotFound(id))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::Release);
        info!("In-memory primary store closed");
    }
}
