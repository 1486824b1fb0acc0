//! Task record model and the request/response DTOs of the HTTP adapter.

pub mod order;
pub mod requests;
pub mod responses;
pub mod task;

// Re-export commonly used types
pub use order::{Direction, OrderSpec, SortField};
pub use requests::{parse_task_id, ListParams, ListQuery, TaskRequest};
pub use responses::{HealthResponse, StatsResponse, TaskResponse};
pub use task::{Task, TaskCondition, TaskDraft, DEFAULT_STATUS};
