//! Background tasks module
//!
//! This module contains background tasks that run alongside the HTTP server.

pub mod timer_orchestrator;

// Re-export main types
pub use timer_orchestrator::{TimerCommand, TimerOrchestrator};
