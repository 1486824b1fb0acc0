//! SQLite primary store on sqlx.
//!
//! Ordering and pagination are pushed down to SQL. Column names in `ORDER BY`
//! come from [`SortField::column`], never from request text.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;

use super::PrimaryStore;
use crate::error::StoreError;
use crate::models::{OrderSpec, SortField, Task, TaskCondition, TaskDraft};

const CREATE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS task (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT    NOT NULL,
    content    TEXT    NOT NULL,
    tag        TEXT    NULL,
    status     INTEGER NOT NULL DEFAULT 1,
    version    INTEGER NOT NULL DEFAULT 1,
    created_at TEXT    NOT NULL,
    updated_at TEXT    NOT NULL
)
"#;

const COLUMNS: &str = "id, name, content, tag, status, version, created_at, updated_at";

pub struct SqlitePrimaryStore {
    pool: SqlitePool,
}

impl SqlitePrimaryStore {
    /// Opens (creating if missing) the database at `url` and ensures the
    /// `task` table exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        // An in-memory database lives and dies with its one connection
        let pool = if url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(options)
                .await?
        };

        sqlx::query(CREATE_TABLE).execute(&pool).await?;
        info!(url = %url, "SQLite primary store ready");

        Ok(Self { pool })
    }
}

fn task_from_row(row: &SqliteRow) -> Result<Task, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    Ok(Task {
        id: id as u64,
        name: row.try_get("name")?,
        content: row.try_get("content")?,
        tag: row.try_get("tag")?,
        status: row.try_get("status")?,
        version: row.try_get("version")?,
        created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
    })
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl PrimaryStore for SqlitePrimaryStore {
    async fn list(
        &self,
        limit: Option<usize>,
        offset: usize,
        order: &OrderSpec,
    ) -> Result<Vec<Task>, StoreError> {
        let column = order.field.unwrap_or(SortField::Id).column();
        let sql = format!(
            "SELECT {} FROM task ORDER BY {} {}, id {} LIMIT ? OFFSET ?",
            COLUMNS,
            column,
            order.direction.keyword(),
            order.direction.keyword()
        );

        // LIMIT -1 is "no limit" in SQLite
        let limit = limit.map(to_i64).unwrap_or(-1);
        let rows = sqlx::query(&sql)
            .bind(limit)
            .bind(to_i64(offset))
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(task_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    async fn get_by_id(&self, id: u64) -> Result<Task, StoreError> {
        let sql = format!("SELECT {} FROM task WHERE id = ?", COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(task_from_row(&row)?),
            None => Err(StoreError::RecordNotFound(id)),
        }
    }

    async fn find_one(&self, condition: &TaskCondition) -> Result<Option<Task>, StoreError> {
        let row = match &condition.tag {
            Some(tag) => {
                let sql = format!(
                    "SELECT {} FROM task WHERE name = ? AND tag = ? ORDER BY id LIMIT 1",
                    COLUMNS
                );
                sqlx::query(&sql)
                    .bind(&condition.name)
                    .bind(tag)
                    .fetch_optional(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "SELECT {} FROM task WHERE name = ? ORDER BY id LIMIT 1",
                    COLUMNS
                );
                sqlx::query(&sql)
                    .bind(&condition.name)
                    .fetch_optional(&self.pool)
                    .await?
            }
        };

        Ok(row.as_ref().map(task_from_row).transpose()?)
    }

    async fn insert(&self, draft: &TaskDraft) -> Result<u64, StoreError> {
        let now = Utc::now();
        let result = sqlx::query(
            "INSERT INTO task (name, content, tag, status, version, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 1, ?, ?)",
        )
        .bind(&draft.name)
        .bind(&draft.content)
        .bind(&draft.tag)
        .bind(draft.status)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid() as u64)
    }

    async fn update(&self, task: &Task) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE task SET name = ?, content = ?, tag = ?, status = ?, version = ?, \
             updated_at = ? WHERE id = ?",
        )
        .bind(&task.name)
        .bind(&task.content)
        .bind(&task.tag)
        .bind(task.status)
        .bind(task.version)
        .bind(task.updated_at)
        .bind(task.id as i64)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RecordNotFound(task.id));
        }
        Ok(())
    }

    async fn delete(&self, id: u64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM task WHERE id = ?")
            .bind(id as i64)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::RecordNotFound(id));
        }
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("SQLite primary store closed");
    }
}
