//! Countdown Timer - a start/pause/resume/stop countdown served over HTTP
//!
//! A [`timer::ClockSource`] drives a [`timer::TimerEngine`], whose ticks are
//! folded by a [`tasks::TimerOrchestrator`] into one observable
//! [`state::TimerState`].

pub mod api;
pub mod config;
pub mod error;
pub mod state;
pub mod tasks;
pub mod timer;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use error::{Result, TimerError};
pub use state::{AppState, TimerState};
pub use tasks::{TimerCommand, TimerOrchestrator};
pub use timer::{ClockSource, EngineStatus, TimerEngine, TimerValue};
pub use utils::signals::shutdown_signal;
