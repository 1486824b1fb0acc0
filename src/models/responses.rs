//! Response DTOs for the task service API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use super::task::Task;
use crate::cache::CacheStats;

/// Code carried by every successful response
pub const CODE_OK: i32 = 0;

/// Envelope for every task operation
#[derive(Debug, Clone, Serialize)]
pub struct TaskResponse {
    pub code: i32,
    pub message: String,
    pub data: Vec<Task>,
}

impl TaskResponse {
    /// Creates a successful response carrying `data`
    pub fn ok(data: Vec<Task>) -> Self {
        Self {
            code: CODE_OK,
            message: "success".to_string(),
            data,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of cache hits
    pub hits: u64,
    /// Number of cache misses
    pub misses: u64,
    /// Current number of keys in cache
    pub total_entries: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
    /// Whether list requests may be served from cache
    pub list_cache_enabled: bool,
    /// Whether get requests may be served from cache
    pub get_cache_enabled: bool,
}

impl StatsResponse {
    /// Combines cache counters with the coordinator's health flags
    pub fn new(stats: &CacheStats, list_cache_enabled: bool, get_cache_enabled: bool) -> Self {
        Self {
            hits: stats.hits,
            misses: stats.misses,
            total_entries: stats.total_entries,
            hit_rate: stats.hit_rate(),
            list_cache_enabled,
            get_cache_enabled,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
