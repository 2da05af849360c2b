//! Error types for the countdown timer

use thiserror::Error;

/// Result type alias using our error type
pub type Result<T> = std::result::Result<T, TimerError>;

/// Errors raised by the engine, the tick stream and the orchestrator handle
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A countdown was requested with a non-positive duration
    #[error("Duration must be greater than 0")]
    InvalidDuration { duration: i64 },

    /// Producing or consuming a tick failed
    #[error("Tick stream fault: {message}")]
    StreamFault { message: String },

    #[error("Failed to lock {what}: lock poisoned")]
    LockPoisoned { what: &'static str },

    /// The orchestrator task is gone
    #[error("Timer orchestrator is not running")]
    ChannelClosed,
}

impl TimerError {
    pub fn stream_fault(message: impl Into<String>) -> Self {
        Self::StreamFault {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_duration_message() {
        let err = TimerError::InvalidDuration { duration: 0 };
        assert_eq!(err.to_string(), "Duration must be greater than 0");
    }

    #[test]
    fn test_stream_fault_message() {
        let err = TimerError::stream_fault("lagged by 3 ticks");
        assert_eq!(err.to_string(), "Tick stream fault: lagged by 3 ticks");
    }
}
