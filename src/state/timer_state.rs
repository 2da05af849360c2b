//! Externally observable timer state

use serde::Serialize;

use crate::timer::TimerValue;

/// The orchestrator's current state. Exactly one variant holds at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum TimerState {
    /// No countdown; ready for a new start
    Idle,
    Running(TimerValue),
    Paused(TimerValue),
    /// Counted down to zero
    Finished(TimerValue),
    Error(String),
}

impl TimerState {
    /// Short lowercase name of the variant
    pub fn name(&self) -> &'static str {
        match self {
            TimerState::Idle => "idle",
            TimerState::Running(_) => "running",
            TimerState::Paused(_) => "paused",
            TimerState::Finished(_) => "finished",
            TimerState::Error(_) => "error",
        }
    }

    /// The countdown value carried by this state, if any
    pub fn value(&self) -> Option<&TimerValue> {
        match self {
            TimerState::Running(value)
            | TimerState::Paused(value)
            | TimerState::Finished(value) => Some(value),
            TimerState::Idle | TimerState::Error(_) => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            TimerState::Error(message) => Some(message),
            _ => None,
        }
    }
}

impl Default for TimerState {
    fn default() -> Self {
        TimerState::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_is_idle() {
        assert_eq!(TimerState::default(), TimerState::Idle);
        assert_eq!(TimerState::default().value(), None);
    }

    #[test]
    fn test_value_accessor() {
        let value = TimerValue::new(3, 5, false);
        assert_eq!(TimerState::Paused(value).value(), Some(&value));
        assert_eq!(TimerState::Finished(value).value(), Some(&value));
        assert_eq!(TimerState::Error("boom".into()).value(), None);
    }

    #[test]
    fn test_serializes_with_state_tag() {
        let json = serde_json::to_value(TimerState::Running(TimerValue::started(5))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "state": "running",
                "data": {"remaining_seconds": 5, "total_seconds": 5, "is_running": true}
            })
        );

        let json = serde_json::to_value(TimerState::Idle).unwrap();
        assert_eq!(json, serde_json::json!({"state": "idle"}));

        let json = serde_json::to_value(TimerState::Error("bad".into())).unwrap();
        assert_eq!(json, serde_json::json!({"state": "error", "data": "bad"}));
    }

    #[test]
    fn test_names() {
        assert_eq!(TimerState::Idle.name(), "idle");
        assert_eq!(TimerState::Error(String::new()).name(), "error");
        assert_eq!(TimerState::Error("x".into()).error_message(), Some("x"));
    }
}
