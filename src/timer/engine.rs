//! Countdown engine: owns the clock and the current value

use std::{
    sync::{Arc, Mutex, MutexGuard, Weak},
    time::Duration,
};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::error::{Result, TimerError};
use super::{ClockSource, TimerValue};

/// Default capacity of the tick broadcast channel
pub const DEFAULT_TICK_CAPACITY: usize = 16;

/// What travels on the tick channel: a value, or a fault that ends the countdown
type TickMessage = Result<TimerValue>;

/// Where the engine's countdown currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineStatus {
    Idle,
    Running,
    Paused,
    /// Counted down to zero on its own
    Finished,
}

#[derive(Debug)]
struct Session {
    value: TimerValue,
    status: EngineStatus,
    clock: ClockSource,
}

/// Single source of truth for one countdown.
///
/// All mutations and all tick publication happen while holding one lock, so
/// a tick can never be applied after `pause_timer`, `stop_timer` or `reset`
/// has returned.
#[derive(Debug)]
pub struct TimerEngine {
    session: Arc<Mutex<Session>>,
    ticks_tx: broadcast::Sender<TickMessage>,
}

impl TimerEngine {
    pub fn new(tick_period: Duration, tick_capacity: usize) -> Self {
        let (ticks_tx, _) = broadcast::channel(tick_capacity.max(1));

        Self {
            session: Arc::new(Mutex::new(Session {
                value: TimerValue::default(),
                status: EngineStatus::Idle,
                clock: ClockSource::new(tick_period),
            })),
            ticks_tx,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Session>> {
        self.session
            .lock()
            .map_err(|_| TimerError::LockPoisoned { what: "timer session" })
    }

    /// Begin a new countdown, discarding whatever was running
    pub fn start_timer(&self, duration_seconds: i64) -> Result<TimerValue> {
        if duration_seconds <= 0 {
            return Err(TimerError::InvalidDuration {
                duration: duration_seconds,
            });
        }

        let mut session = self.lock()?;
        session.clock.stop();
        session.value = TimerValue::started(duration_seconds as u64);
        session.status = EngineStatus::Running;
        self.arm(&mut session);

        info!("Timer started for {} seconds", duration_seconds);
        Ok(session.value)
    }

    /// Freeze the countdown where it is. No-op unless running.
    pub fn pause_timer(&self) -> Result<TimerValue> {
        let mut session = self.lock()?;
        if session.status != EngineStatus::Running {
            debug!("Pause ignored, timer is {:?}", session.status);
            return Ok(session.value);
        }

        session.clock.stop();
        session.value = session.value.with_running(false);
        session.status = EngineStatus::Paused;

        info!("Timer paused at {}", session.value);
        Ok(session.value)
    }

    /// Continue a paused countdown. No-op unless paused with time left.
    pub fn resume_timer(&self) -> Result<TimerValue> {
        let mut session = self.lock()?;
        if session.status != EngineStatus::Paused || session.value.is_finished() {
            debug!("Resume ignored, timer is {:?}", session.status);
            return Ok(session.value);
        }

        session.value = session.value.with_running(true);
        session.status = EngineStatus::Running;
        self.arm(&mut session);

        info!("Timer resumed at {}", session.value);
        Ok(session.value)
    }

    /// Cancel the countdown. The returned value is zeroed and the engine is idle.
    pub fn stop_timer(&self) -> Result<TimerValue> {
        let mut session = self.lock()?;
        let previous = session.status;
        session.clock.stop();
        session.value = session.value.zeroed();
        session.status = EngineStatus::Idle;

        if previous != EngineStatus::Idle {
            info!("Timer stopped ({:?} before)", previous);
        }
        Ok(session.value)
    }

    /// Stop the clock and clear every field
    pub fn reset(&self) -> Result<()> {
        let mut session = self.lock()?;
        session.clock.stop();
        session.value = TimerValue::default();
        session.status = EngineStatus::Idle;

        debug!("Timer engine reset");
        Ok(())
    }

    pub fn current(&self) -> Result<TimerValue> {
        self.lock().map(|session| session.value)
    }

    pub fn status(&self) -> Result<EngineStatus> {
        self.lock().map(|session| session.status)
    }

    pub fn is_clock_running(&self) -> Result<bool> {
        self.lock().map(|session| session.clock.is_running())
    }

    /// Subscribe to every value produced by a running countdown
    pub fn ticks(&self) -> TickSubscription {
        TickSubscription {
            rx: self.ticks_tx.subscribe(),
        }
    }

    fn arm(&self, session: &mut Session) {
        let weak = Arc::downgrade(&self.session);
        let ticks_tx = self.ticks_tx.clone();
        session
            .clock
            .start(move |generation| on_tick(&weak, &ticks_tx, generation));
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(super::DEFAULT_TICK_PERIOD, DEFAULT_TICK_CAPACITY)
    }
}

fn on_tick(
    session: &Weak<Mutex<Session>>,
    ticks_tx: &broadcast::Sender<TickMessage>,
    generation: u64,
) {
    let Some(shared) = session.upgrade() else {
        return;
    };
    let mut session = match shared.lock() {
        Ok(session) => session,
        Err(poisoned) => {
            // Halt the countdown and tell subscribers instead of stalling silently
            let mut session = poisoned.into_inner();
            if session.clock.is_current(generation) {
                session.clock.stop();
                warn!("Timer session lock poisoned, stopping countdown");
                let _ = ticks_tx.send(Err(TimerError::stream_fault("timer session lock poisoned")));
            }
            return;
        }
    };

    if !session.clock.is_current(generation) {
        debug!("Dropping stale tick from generation {}", generation);
        return;
    }

    session.value = session.value.ticked();
    if session.value.is_finished() {
        session.clock.stop();
        session.status = EngineStatus::Finished;
        info!("Timer finished");
    }

    // No subscribers is not an error
    let _ = ticks_tx.send(Ok(session.value));
}

/// An open subscription to an engine's tick stream.
///
/// Owned by exactly one consumer; `close` consumes it.
#[derive(Debug)]
pub struct TickSubscription {
    rx: broadcast::Receiver<TickMessage>,
}

impl TickSubscription {
    /// Wait for the next tick.
    ///
    /// A lagging receiver, a dropped engine or a fault raised while producing
    /// the tick is reported as a stream fault.
    pub async fn next(&mut self) -> Result<TimerValue> {
        match self.rx.recv().await {
            Ok(message) => message,
            Err(RecvError::Lagged(missed)) => Err(TimerError::stream_fault(format!(
                "subscriber lagged behind by {} ticks",
                missed
            ))),
            Err(RecvError::Closed) => Err(TimerError::stream_fault("tick stream closed")),
        }
    }

    pub fn close(self) {
        drop(self.rx);
    }
}
