//! API Routes
//!
//! Configures the Axum router with the task endpoints.

use axum::{routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_task_handler, delete_task_handler, get_task_handler, health_handler,
    list_tasks_handler, stats_handler, update_task_handler, AppState,
};

/// Prefix of every task endpoint
pub const TASKS_PATH: &str = "/task-service/api/v1/tasks";

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /task-service/api/v1/tasks` - List tasks (`limit`, `offset`, `order`)
/// - `POST /task-service/api/v1/tasks` - Create a task
/// - `GET /task-service/api/v1/tasks/:task_id` - Get a task
/// - `PUT /task-service/api/v1/tasks/:task_id` - Update a task
/// - `DELETE /task-service/api/v1/tasks/:task_id` - Delete a task
/// - `GET /stats` - Cache statistics and health flags
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(TASKS_PATH, get(list_tasks_handler).post(create_task_handler))
        .route(
            &format!("{}/:task_id", TASKS_PATH),
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::in_memory(&Config::default()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_create_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(TASKS_PATH)
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"write docs","content":"all"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], 0);
        assert_eq!(json["data"][0]["id"], 1);
        assert_eq!(json["data"][0]["version"], 1);
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri(format!("{}/99", TASKS_PATH))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_id_is_bad_request() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("{}/-1", TASKS_PATH))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
