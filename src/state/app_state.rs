//! Main application state: the composition root shared by HTTP handlers

use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::TimerState;
use crate::{
    error::Result,
    tasks::TimerOrchestrator,
    timer::TimerEngine,
};

/// Owns the one countdown session served by this process
#[derive(Debug)]
pub struct AppState {
    /// Engine shared with the orchestrator task; callers go through the orchestrator
    engine: Arc<TimerEngine>,
    pub orchestrator: TimerOrchestrator,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    /// Build the engine and spawn its orchestrator. Must run inside a tokio runtime.
    pub fn new(port: u16, host: String, tick_period: Duration, tick_capacity: usize) -> Self {
        let engine = Arc::new(TimerEngine::new(tick_period, tick_capacity));
        let orchestrator = TimerOrchestrator::spawn(Arc::clone(&engine));

        Self {
            engine,
            orchestrator,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Remember the latest command issued by a client
    pub fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    pub async fn start_timer(&self, seconds: i64) -> Result<TimerState> {
        info!("Start requested for {} seconds", seconds);
        self.record_action("start");
        self.orchestrator.request_start(seconds).await
    }

    pub async fn pause_timer(&self) -> Result<TimerState> {
        self.record_action("pause");
        self.orchestrator.request_pause().await
    }

    pub async fn resume_timer(&self) -> Result<TimerState> {
        self.record_action("resume");
        self.orchestrator.request_resume().await
    }

    pub async fn stop_timer(&self) -> Result<TimerState> {
        self.record_action("stop");
        self.orchestrator.request_stop().await
    }

    pub fn timer_state(&self) -> TimerState {
        self.orchestrator.state()
    }

    /// Tear the session down: orchestrator first, which then resets the engine.
    ///
    /// If the orchestrator is already gone the engine is reset here so its
    /// clock cannot outlive the session.
    pub async fn shutdown(&self) -> Result<()> {
        let outcome = self.orchestrator.shutdown().await;
        if let Err(e) = &outcome {
            warn!("Orchestrator shutdown failed ({}), resetting engine directly", e);
            self.engine.reset()?;
        }
        outcome
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        format_uptime(self.start_time.elapsed())
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}

fn format_uptime(duration: Duration) -> String {
    let hours = duration.as_secs() / 3600;
    let minutes = (duration.as_secs() % 3600) / 60;
    let seconds = duration.as_secs() % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}
