//! Countdown core
//!
//! The clock produces heartbeats, the engine turns them into [`TimerValue`]
//! snapshots and publishes them to subscribers.

pub mod clock;
pub mod engine;
pub mod value;

pub use clock::{ClockSource, DEFAULT_TICK_PERIOD};
pub use engine::{EngineStatus, TickSubscription, TimerEngine, DEFAULT_TICK_CAPACITY};
pub use value::TimerValue;
