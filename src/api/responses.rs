//! API request and response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::TimerState;

/// Body of `POST /timer/start`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartRequest {
    pub seconds: i64,
}

/// Response for every timer endpoint
#[derive(Debug, Clone, Serialize)]
pub struct TimerResponse {
    /// Name of the timer state, e.g. `running`
    pub status: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub timer: TimerState,
    /// `MM:SS` of the remaining time when a countdown exists
    pub formatted_time: Option<String>,
    pub progress: Option<f64>,
}

impl TimerResponse {
    /// Build a response; an error state replaces the message with its own
    pub fn new(message: impl Into<String>, timer: TimerState) -> Self {
        let message = match timer.error_message() {
            Some(reason) => reason.to_string(),
            None => message.into(),
        };

        Self {
            status: timer.name().to_string(),
            message,
            timestamp: Utc::now(),
            formatted_time: timer.value().map(|value| value.formatted_time()),
            progress: timer.value().map(|value| value.progress()),
            timer,
        }
    }
}

/// Status response with server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    pub timer: TimerState,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    /// Create a new health response
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
