//! Error types for the task service
//!
//! Two layers: [`StoreError`] for whatever a backend reports, and
//! [`ServiceError`] for what a caller of the coordinator gets to see.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Errors raised by the primary store or the cache store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No record with this id in the primary store
    #[error("Record not found: {0}")]
    RecordNotFound(u64),

    /// Backend cannot be reached or has been closed
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// Cache key space is full
    #[error("Capacity exceeded: limit of {0} keys reached")]
    CapacityExceeded(usize),

    /// Key rejected by the cache (empty or too long)
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Key holds a value of another kind than the operation expects
    #[error("Wrong value type for key: {0}")]
    WrongType(String),

    /// A cached field map could not be turned back into a record
    #[error("Decode error: {0}")]
    Decode(String),

    /// SQL backend failure
    #[error("Query failed: {0}")]
    Query(#[from] sqlx::Error),
}

// == Service Error Enum ==
/// Errors surfaced by the coordinator to its callers.
///
/// Cache failures never appear here; they are absorbed by the coordinator.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Requested task is absent from the primary store
    #[error("Task {0} does not exist")]
    NotFound(u64),

    /// Create would violate name/tag uniqueness
    #[error("Task already exists: {0}")]
    AlreadyExists(String),

    /// Resource lock held by someone else, or the lock backend failed
    #[error("Resource is locked, try again later: {0}")]
    LockUnavailable(String),

    /// Malformed input
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Operation exceeded its deadline
    #[error("Operation timed out: {0}")]
    Timeout(&'static str),

    /// Primary store failure, no fallback exists
    #[error("Primary store failure: {0}")]
    Primary(#[source] StoreError),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RecordNotFound(id) => ServiceError::NotFound(id),
            other => ServiceError::Primary(other),
        }
    }
}

impl ServiceError {
    /// Status code paired with the rpc-style error code used in response bodies.
    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            ServiceError::NotFound(_) => (StatusCode::NOT_FOUND, 5),
            ServiceError::AlreadyExists(_) => (StatusCode::CONFLICT, 6),
            ServiceError::LockUnavailable(_) => (StatusCode::LOCKED, 14),
            ServiceError::InvalidRequest(_) => (StatusCode::BAD_REQUEST, 3),
            ServiceError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, 4),
            ServiceError::Primary(_) => (StatusCode::INTERNAL_SERVER_ERROR, 13),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let body = Json(json!({
            "code": code,
            "message": self.to_string(),
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for coordinator and handler code.
pub type Result<T> = std::result::Result<T, ServiceError>;
