//! HTTP API module
//!
//! This module contains all HTTP endpoint handlers and response structures.

pub mod handlers;
pub mod responses;

use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use handlers::*;

/// Create the HTTP router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/timer", get(timer_handler))
        .route("/timer/start", post(start_handler))
        .route("/timer/pause", post(pause_handler))
        .route("/timer/resume", post(resume_handler))
        .route("/timer/stop", post(stop_handler))
        .route("/status", get(status_handler))
        .route("/health", get(health_handler))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use std::time::Duration;
    use tower::ServiceExt;

    fn app() -> (Router, Arc<AppState>) {
        let state = Arc::new(AppState::new(
            20554,
            "127.0.0.1".to_string(),
            Duration::from_secs(1),
            16,
        ));
        (create_router(Arc::clone(&state)), state)
    }

    async fn call(
        router: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
            .unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_pause_resume_stop_flow() {
        let (router, _state) = app();

        let start = Some(json!({"seconds": 90}));
        let (status, body) = call(&router, "POST", "/timer/start", start).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "running");
        assert_eq!(body["formatted_time"], "01:30");
        assert_eq!(body["timer"]["data"]["total_seconds"], 90);

        tokio::time::sleep(Duration::from_millis(2500)).await;

        let (_, body) = call(&router, "POST", "/timer/pause", None).await;
        assert_eq!(body["status"], "paused");
        assert_eq!(body["timer"]["data"]["remaining_seconds"], 88);

        let (_, body) = call(&router, "POST", "/timer/resume", None).await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["timer"]["data"]["is_running"], true);

        let (_, body) = call(&router, "POST", "/timer/stop", None).await;
        assert_eq!(body["status"], "idle");
        assert_eq!(body["formatted_time"], Value::Null);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_duration_reports_error_state() {
        let (router, _state) = app();

        let start = Some(json!({"seconds": 0}));
        let (status, body) = call(&router, "POST", "/timer/start", start).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], "Duration must be greater than 0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_start_body_is_rejected() {
        let (router, _state) = app();

        let (status, _) = call(&router, "POST", "/timer/start", Some(json!({"minutes": 5}))).await;
        assert!(status.is_client_error());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timer_endpoint_reports_finished() {
        let (router, _state) = app();
        call(&router, "POST", "/timer/start", Some(json!({"seconds": 2}))).await;
        tokio::time::sleep(Duration::from_millis(2100)).await;

        let (status, body) = call(&router, "GET", "/timer", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "finished");
        assert_eq!(body["progress"], 1.0);
        assert_eq!(body["formatted_time"], "00:00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_and_health() {
        let (router, _state) = app();
        call(&router, "POST", "/timer/start", Some(json!({"seconds": 5}))).await;

        let (status, body) = call(&router, "GET", "/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["last_action"], "start");
        assert_eq!(body["port"], 20554);
        assert_eq!(body["timer"]["state"], "running");

        let (status, body) = call(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn test_commands_after_shutdown_fail() {
        let (router, state) = app();
        state.shutdown().await.unwrap();

        let (status, _) = call(&router, "POST", "/timer/stop", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
