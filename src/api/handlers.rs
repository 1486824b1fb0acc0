//! API Handlers
//!
//! HTTP request handlers for the task endpoints. Each one binds and validates
//! input, then hands off to the [`Coordinator`].

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use tokio::sync::RwLock;
use tracing::info;

use crate::cache::MemoryCache;
use crate::config::Config;
use crate::coordinator::{Coordinator, CoordinatorSettings};
use crate::data::{MemoryPrimaryStore, PrimaryStore, SqlitePrimaryStore};
use crate::error::{Result, ServiceError, StoreError};
use crate::models::{
    parse_task_id, HealthResponse, ListParams, StatsResponse, TaskRequest, TaskResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<Coordinator>,
    /// The cache backing the coordinator, kept for stats and cleanup
    pub cache: Arc<RwLock<MemoryCache>>,
    pub default_page_size: usize,
}

impl AppState {
    /// Creates a new AppState over an explicit primary store.
    pub fn new(config: &Config, primary: Arc<dyn PrimaryStore>) -> Self {
        let cache = Arc::new(RwLock::new(MemoryCache::new(config.cache_max_entries)));
        let coordinator = Coordinator::new(
            primary,
            cache.clone(),
            CoordinatorSettings::from_config(config),
        );

        Self {
            coordinator: Arc::new(coordinator),
            cache,
            default_page_size: config.default_page_size,
        }
    }

    /// State with the in-process primary store.
    pub fn in_memory(config: &Config) -> Self {
        Self::new(config, Arc::new(MemoryPrimaryStore::new()))
    }

    /// Creates a new AppState from configuration: SQLite when `DATABASE_URL`
    /// is set, the in-process store otherwise.
    pub async fn from_config(config: &Config) -> std::result::Result<Self, StoreError> {
        match &config.database_url {
            Some(url) => {
                let primary = SqlitePrimaryStore::connect(url).await?;
                info!("Primary store: sqlite");
                Ok(Self::new(config, Arc::new(primary)))
            }
            None => {
                info!("Primary store: in-process");
                Ok(Self::in_memory(config))
            }
        }
    }
}

fn task_id(raw: &str) -> Result<u64> {
    parse_task_id(raw)
        .ok_or_else(|| ServiceError::InvalidRequest(format!("invalid task id '{}'", raw)))
}

/// Handler for GET /task-service/api/v1/tasks
pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<TaskResponse>> {
    let query = params.into_query(state.default_page_size);
    let tasks = state.coordinator.list(query).await?;

    Ok(Json(TaskResponse::ok(tasks)))
}

/// Handler for GET /task-service/api/v1/tasks/:task_id
pub async fn get_task_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<TaskResponse>> {
    let id = task_id(&raw_id)?;
    let task = state.coordinator.get(id).await?;

    Ok(Json(TaskResponse::ok(vec![task])))
}

/// Handler for POST /task-service/api/v1/tasks
pub async fn create_task_handler(
    State(state): State<AppState>,
    Json(req): Json<TaskRequest>,
) -> Result<Json<TaskResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let task = state.coordinator.create(req.into_draft()).await?;

    Ok(Json(TaskResponse::ok(vec![task])))
}

/// Handler for PUT /task-service/api/v1/tasks/:task_id
pub async fn update_task_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Json(req): Json<TaskRequest>,
) -> Result<Json<TaskResponse>> {
    let id = task_id(&raw_id)?;
    if let Some(error_msg) = req.validate() {
        return Err(ServiceError::InvalidRequest(error_msg));
    }

    let task = state.coordinator.update(id, req.into_draft()).await?;

    Ok(Json(TaskResponse::ok(vec![task])))
}

/// Handler for DELETE /task-service/api/v1/tasks/:task_id
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<TaskResponse>> {
    let id = task_id(&raw_id)?;
    state.coordinator.delete(id).await?;

    Ok(Json(TaskResponse::ok(Vec::new())))
}

/// Handler for GET /stats
///
/// Cache counters plus the coordinator's cache health flags.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.read().await.stats();
    let health = state.coordinator.health();

    Json(StatsResponse::new(
        &stats,
        health.list_cache_enabled,
        health.get_cache_enabled,
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
