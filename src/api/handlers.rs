//! HTTP endpoint handlers

use std::sync::Arc;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use tracing::{error, info};

use crate::{
    error::Result,
    state::{AppState, TimerState},
};
use super::responses::{HealthResponse, StartRequest, StatusResponse, TimerResponse};

type ApiResult = std::result::Result<Json<TimerResponse>, StatusCode>;

fn reply(action: &str, message: &str, outcome: Result<TimerState>) -> ApiResult {
    match outcome {
        Ok(timer) => {
            info!("{} endpoint called - timer is {}", action, timer.name());
            Ok(Json(TimerResponse::new(message, timer)))
        }
        Err(e) => {
            error!("Failed to {} timer: {}", action, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// Handle POST /timer/start - Begin a countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartRequest>,
) -> ApiResult {
    reply("start", "Timer started", state.start_timer(request.seconds).await)
}

/// Handle POST /timer/pause - Freeze the countdown
pub async fn pause_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    reply("pause", "Timer paused", state.pause_timer().await)
}

/// Handle POST /timer/resume - Continue a paused countdown
pub async fn resume_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    reply("resume", "Timer resumed", state.resume_timer().await)
}

/// Handle POST /timer/stop - Cancel the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ApiResult {
    reply("stop", "Timer stopped", state.stop_timer().await)
}

/// Handle GET /timer - Current timer state
pub async fn timer_handler(State(state): State<Arc<AppState>>) -> Json<TimerResponse> {
    Json(TimerResponse::new("Current timer", state.timer_state()))
}

/// Handle GET /status - Timer state plus server metadata
pub async fn status_handler(State(state): State<Arc<AppState>>) -> Json<StatusResponse> {
    let (last_action, last_action_time) = state.get_last_action();

    Json(StatusResponse {
        timer: state.timer_state(),
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    })
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
