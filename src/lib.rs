//! Task Service - a task record API with a consistency-checked cache
//!
//! Reads and writes go through a [`Coordinator`] that keeps an in-memory
//! cache in step with the primary store, serialized by a lock held in the
//! cache itself.

pub mod api;
pub mod cache;
pub mod config;
pub mod coordinator;
pub mod data;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use coordinator::{Coordinator, CoordinatorSettings, HealthSnapshot};
pub use error::{ServiceError, StoreError};
pub use tasks::spawn_cleanup_task;
