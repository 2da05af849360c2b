//! Timer orchestrator: turns commands and engine ticks into one observable state
//!
//! Commands and ticks are handled by a single background task, one at a time.
//! Commands take priority over ticks that are ready at the same moment, so a
//! pause or stop always cancels the tick subscription before a pending tick
//! could be looked at.

use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::{
    error::{Result, TimerError},
    state::TimerState,
    timer::{TickSubscription, TimerEngine, TimerValue},
};

/// Maximum number of queued commands
const COMMAND_QUEUE_CAPACITY: usize = 32;

/// Commands accepted by the orchestrator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerCommand {
    Start(i64),
    Pause,
    Resume,
    Stop,
}

#[derive(Debug)]
enum Message {
    Command(TimerCommand, oneshot::Sender<TimerState>),
    Shutdown(oneshot::Sender<()>),
}

/// Handle to a running orchestrator task.
///
/// Cheap to clone; every clone talks to the same task. The task ends on
/// [`TimerOrchestrator::shutdown`] or when the last handle is dropped.
#[derive(Debug, Clone)]
pub struct TimerOrchestrator {
    commands_tx: mpsc::Sender<Message>,
    state_rx: watch::Receiver<TimerState>,
}

impl TimerOrchestrator {
    /// Spawn the orchestrator task on the current tokio runtime
    pub fn spawn(engine: Arc<TimerEngine>) -> Self {
        let (commands_tx, commands_rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (state_tx, state_rx) = watch::channel(TimerState::Idle);

        let task = OrchestratorTask {
            engine,
            commands_rx,
            state_tx,
            subscription: None,
        };
        tokio::spawn(task.run());

        Self {
            commands_tx,
            state_rx,
        }
    }

    pub async fn request_start(&self, duration_seconds: i64) -> Result<TimerState> {
        self.send(TimerCommand::Start(duration_seconds)).await
    }

    pub async fn request_pause(&self) -> Result<TimerState> {
        self.send(TimerCommand::Pause).await
    }

    pub async fn request_resume(&self) -> Result<TimerState> {
        self.send(TimerCommand::Resume).await
    }

    pub async fn request_stop(&self) -> Result<TimerState> {
        self.send(TimerCommand::Stop).await
    }

    /// Queue a command and wait until it has been handled.
    ///
    /// Returns the state right after handling.
    pub async fn send(&self, command: TimerCommand) -> Result<TimerState> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands_tx
            .send(Message::Command(command, reply_tx))
            .await
            .map_err(|_| TimerError::ChannelClosed)?;
        reply_rx.await.map_err(|_| TimerError::ChannelClosed)
    }

    /// Current state
    pub fn state(&self) -> TimerState {
        self.state_rx.borrow().clone()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<TimerState> {
        self.state_rx.clone()
    }

    /// Tear down the task: close the tick subscription, then reset the engine.
    pub async fn shutdown(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands_tx
            .send(Message::Shutdown(reply_tx))
            .await
            .map_err(|_| TimerError::ChannelClosed)?;
        reply_rx.await.map_err(|_| TimerError::ChannelClosed)
    }
}

struct OrchestratorTask {
    engine: Arc<TimerEngine>,
    commands_rx: mpsc::Receiver<Message>,
    state_tx: watch::Sender<TimerState>,
    subscription: Option<TickSubscription>,
}

impl OrchestratorTask {
    async fn run(mut self) {
        info!("Starting timer orchestrator");

        loop {
            tokio::select! {
                biased;

                message = self.commands_rx.recv() => match message {
                    Some(Message::Command(command, reply)) => {
                        let state = self.handle(command);
                        // The caller may have given up waiting
                        let _ = reply.send(state);
                    }
                    Some(Message::Shutdown(reply)) => {
                        self.dispose();
                        let _ = reply.send(());
                        return;
                    }
                    None => break,
                },

                tick = next_tick(&mut self.subscription) => self.on_tick(tick),
            }
        }

        self.dispose();
    }

    fn handle(&mut self, command: TimerCommand) -> TimerState {
        debug!("Handling {:?} in state {}", command, self.state_tx.borrow().name());

        let outcome = match command {
            TimerCommand::Start(seconds) => self.start(seconds),
            TimerCommand::Pause => self.pause(),
            TimerCommand::Resume => self.resume(),
            TimerCommand::Stop => self.stop(),
        };

        match outcome {
            Ok(state) => self.transition(state),
            Err(e) => self.fail(e),
        }
    }

    fn start(&mut self, seconds: i64) -> Result<TimerState> {
        self.close_subscription();
        if seconds <= 0 {
            return Err(TimerError::InvalidDuration { duration: seconds });
        }

        // Retire the previous session before listening, so none of its ticks
        // can land in the new subscription.
        self.engine.stop_timer()?;
        self.subscription = Some(self.engine.ticks());
        let value = self.engine.start_timer(seconds)?;
        Ok(TimerState::Running(value))
    }

    fn pause(&mut self) -> Result<TimerState> {
        let current = self.state_tx.borrow().clone();
        if !matches!(current, TimerState::Running(_) | TimerState::Paused(_)) {
            debug!("Pause ignored in state {}", current.name());
            return Ok(current);
        }

        self.close_subscription();
        let value = self.engine.pause_timer()?;
        Ok(settled(value, TimerState::Paused))
    }

    fn resume(&mut self) -> Result<TimerState> {
        let current = self.state_tx.borrow().clone();
        if !matches!(current, TimerState::Paused(_)) {
            debug!("Resume ignored in state {}", current.name());
            return Ok(current);
        }

        // The engine clock is stopped while paused, nothing can be missed here
        self.subscription = Some(self.engine.ticks());
        let value = self.engine.resume_timer()?;
        if value.is_finished() {
            self.close_subscription();
            return Ok(TimerState::Finished(value));
        }
        Ok(TimerState::Running(value))
    }

    fn stop(&mut self) -> Result<TimerState> {
        self.close_subscription();
        self.engine.stop_timer()?;
        Ok(TimerState::Idle)
    }

    fn on_tick(&mut self, tick: Result<TimerValue>) {
        match tick {
            Ok(value) if value.remaining_seconds == 0 => {
                self.close_subscription();
                self.transition(TimerState::Finished(value));
            }
            Ok(value) => {
                self.transition(TimerState::Running(value));
            }
            Err(e) => {
                self.fail(e);
            }
        }
    }

    fn fail(&mut self, e: TimerError) -> TimerState {
        warn!("Timer error: {}", e);
        self.close_subscription();
        if let Err(stop_err) = self.engine.stop_timer() {
            error!("Failed to stop timer after error: {}", stop_err);
        }
        self.transition(TimerState::Error(e.to_string()))
    }

    fn transition(&mut self, next: TimerState) -> TimerState {
        let changed = self.state_tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next.clone();
            true
        });

        if changed {
            match &next {
                TimerState::Running(value) => debug!("Timer running: {}", value),
                other => info!("Timer state -> {}", other.name()),
            }
        }
        next
    }

    fn close_subscription(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.close();
        }
    }

    fn dispose(&mut self) {
        self.close_subscription();
        if let Err(e) = self.engine.reset() {
            error!("Failed to reset timer engine: {}", e);
        }
        info!("Timer orchestrator stopped");
    }
}

/// A value whose countdown already hit zero is finished, whatever else happened
fn settled(value: TimerValue, otherwise: fn(TimerValue) -> TimerState) -> TimerState {
    if value.is_finished() {
        TimerState::Finished(value)
    } else {
        otherwise(value)
    }
}

async fn next_tick(subscription: &mut Option<TickSubscription>) -> Result<TimerValue> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}
