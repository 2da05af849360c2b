//! Periodic heartbeat driving the countdown

use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{
    task::JoinHandle,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::debug;

/// Default heartbeat period
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_secs(1);

/// A restartable one-tick-per-period heartbeat.
///
/// Every `start` arms a new generation; `stop` retires it. The callback is
/// handed the generation it was armed with so that an owner sharing state
/// with the callback can drop a tick that raced with `stop` (see
/// [`ClockSource::is_current`]). At most one heartbeat task exists per
/// instance. Must be started from within a tokio runtime.
#[derive(Debug)]
pub struct ClockSource {
    period: Duration,
    generation: Arc<AtomicU64>,
    handle: Option<JoinHandle<()>>,
}

impl ClockSource {
    pub fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_millis(1)),
            generation: Arc::new(AtomicU64::new(0)),
            handle: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Start ticking, replacing any heartbeat already running.
    ///
    /// The first tick fires one full period after this call. Returns the
    /// generation passed to `on_tick`.
    pub fn start<F>(&mut self, on_tick: F) -> u64
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        self.stop();

        let armed = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        let generation = Arc::clone(&self.generation);
        let period = self.period;

        self.handle = Some(tokio::spawn(async move {
            let mut interval = interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                if generation.load(Ordering::Acquire) != armed {
                    break;
                }
                on_tick(armed);
            }
        }));

        debug!("Clock armed (generation {}, period {:?})", armed, period);
        armed
    }

    /// Stop ticking. Safe to call when already stopped.
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            let retired = self.generation.fetch_add(1, Ordering::AcqRel);
            handle.abort();
            debug!("Clock stopped (generation {})", retired);
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether a tick of `generation` still belongs to the live heartbeat
    pub fn is_current(&self, generation: u64) -> bool {
        self.handle.is_some() && self.generation.load(Ordering::Acquire) == generation
    }
}

impl Default for ClockSource {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_PERIOD)
    }
}

impl Drop for ClockSource {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::time::sleep;

    fn counting_clock() -> (ClockSource, Arc<AtomicUsize>) {
        (ClockSource::default(), Arc::new(AtomicUsize::new(0)))
    }

    fn counter(count: &Arc<AtomicUsize>) -> impl Fn(u64) + Send + Sync + 'static {
        let count = Arc::clone(count);
        move |_| {
            count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let (mut clock, count) = counting_clock();
        clock.start(counter(&count));

        sleep(Duration::from_millis(500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0, "first tick is a full period away");

        sleep(Duration::from_millis(3000)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(clock.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_prevents_further_ticks() {
        let (mut clock, count) = counting_clock();
        clock.start(counter(&count));

        sleep(Duration::from_millis(2500)).await;
        clock.stop();
        assert!(!clock.is_running());

        sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent() {
        let (mut clock, count) = counting_clock();
        clock.stop();
        clock.start(counter(&count));
        clock.stop();
        clock.stop();

        sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_replaces_previous_heartbeat() {
        let (mut clock, count) = counting_clock();
        let first = clock.start(counter(&count));
        let second = clock.start(counter(&count));

        assert_ne!(first, second);
        assert!(!clock.is_current(first));
        assert!(clock.is_current(second));

        sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_heartbeat() {
        let (mut clock, count) = counting_clock();
        clock.start(counter(&count));
        drop(clock);

        sleep(Duration::from_secs(3)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_callback_receives_armed_generation() {
        let mut clock = ClockSource::new(Duration::from_millis(200));
        let seen = Arc::new(AtomicU64::new(0));
        let sink = Arc::clone(&seen);
        let armed = clock.start(move |generation| sink.store(generation, Ordering::SeqCst));

        sleep(Duration::from_millis(250)).await;
        assert_eq!(seen.load(Ordering::SeqCst), armed);
    }

    #[test]
    fn test_zero_period_is_raised_to_minimum() {
        let clock = ClockSource::new(Duration::ZERO);
        assert_eq!(clock.period(), Duration::from_millis(1));
        assert!(!clock.is_current(0));
    }
}
