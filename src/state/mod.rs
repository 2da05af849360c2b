//! State management module
//!
//! This module contains the externally observable timer state and the
//! application state that wires the timer together.

pub mod app_state;
pub mod timer_state;

// Re-export main types
pub use app_state::AppState;
pub use timer_state::TimerState;
