//! API Module
//!
//! HTTP handlers and routing for the task service REST API.
//!
//! # Endpoints
//! - `GET|POST /task-service/api/v1/tasks` - List or create tasks
//! - `GET|PUT|DELETE /task-service/api/v1/tasks/:task_id` - One task
//! - `GET /stats` - Cache statistics and health flags
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, TASKS_PATH};
