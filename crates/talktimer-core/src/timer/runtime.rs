//! Tokio driver for the timer engine.
//!
//! The engine owns no tasks; this runtime holds the single cancellable
//! periodic driver and disposes of it on pause/reset. The driver is
//! advisory only -- remaining time is always recomputed from the absolute
//! deadline, so delayed or skipped ticks self-correct on the next firing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::warn;

use super::engine::{TimerConfig, TimerEngine, TimerStatus};
use crate::events::Event;

/// Shared timer engine plus the periodic driver that ticks it.
///
/// All engine mutation is serialized behind the mutex: commands, the
/// periodic recompute, and the finish flash can never interleave.
pub struct TimerRuntime {
    engine: Arc<Mutex<TimerEngine>>,
    driver: Option<JoinHandle<()>>,
}

impl TimerRuntime {
    pub fn new(engine: TimerEngine) -> Self {
        Self {
            engine: Arc::new(Mutex::new(engine)),
            driver: None,
        }
    }

    /// Shared handle for render loops and other readers.
    pub fn engine(&self) -> Arc<Mutex<TimerEngine>> {
        self.engine.clone()
    }

    pub fn snapshot(&self) -> Option<Event> {
        self.with_engine(|e| e.snapshot())
    }

    pub fn status(&self) -> Option<TimerStatus> {
        self.with_engine(|e| e.status())
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        let event = self.with_engine(|e| e.start()).flatten();
        if event.is_some() {
            self.spawn_driver();
        }
        event
    }

    pub fn pause(&mut self) -> Option<Event> {
        let event = self.with_engine(|e| e.pause()).flatten();
        self.cancel_driver();
        event
    }

    pub fn reset(&mut self) -> Option<Event> {
        let event = self.with_engine(|e| e.reset()).flatten();
        self.cancel_driver();
        event
    }

    pub fn configure(&mut self, config: TimerConfig) -> Option<Event> {
        let event = self.with_engine(|e| e.configure(config)).flatten();
        self.cancel_driver();
        event
    }

    pub fn toggle(&mut self) -> Option<Event> {
        let event = self.with_engine(|e| e.toggle()).flatten();
        match self.status() {
            Some(TimerStatus::Running) => self.spawn_driver(),
            _ => self.cancel_driver(),
        }
        event
    }

    pub fn scrub(&mut self, new_remaining_secs: u32) -> Option<Event> {
        let event = self.with_engine(|e| e.scrub(new_remaining_secs)).flatten();
        // Scrubbing out of the finished state lands in paused; the driver
        // must not keep flashing.
        if !matches!(
            self.status(),
            Some(TimerStatus::Running) | Some(TimerStatus::Finished)
        ) {
            self.cancel_driver();
        }
        event
    }

    // ── Suspension hooks ─────────────────────────────────────────────

    /// The driver is left in place: the whole process may stop executing,
    /// and the deadline recompute absorbs the gap on the next tick.
    pub fn handle_suspend(&mut self) {
        self.with_engine(|e| e.handle_suspend());
    }

    pub fn handle_resume(&mut self) -> Option<Event> {
        let event = self.with_engine(|e| e.handle_resume()).flatten();
        if self.status() == Some(TimerStatus::Running) {
            self.spawn_driver();
        }
        event
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn with_engine<R>(&self, f: impl FnOnce(&mut TimerEngine) -> R) -> Option<R> {
        match self.engine.lock() {
            Ok(mut engine) => Some(f(&mut engine)),
            Err(_) => {
                warn!("engine mutex poisoned; dropping command");
                None
            }
        }
    }

    /// Spawn the once-per-second driver. Idempotent: a live driver is
    /// never doubled, so repeated starts cannot produce conflicting
    /// recomputation sources.
    fn spawn_driver(&mut self) {
        if self.driver_alive() {
            return;
        }
        let engine = self.engine.clone();
        self.driver = Some(tokio::spawn(async move {
            let mut ticker = time::interval(Duration::from_secs(1));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately.
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Ok(mut engine) = engine.lock() else {
                    warn!("engine mutex poisoned; stopping timer driver");
                    break;
                };
                match engine.status() {
                    TimerStatus::Running => {
                        engine.recompute_remaining();
                    }
                    TimerStatus::Finished => engine.toggle_flash(),
                    _ => break,
                }
            }
        }));
    }

    fn driver_alive(&self) -> bool {
        self.driver.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn cancel_driver(&mut self) {
        if let Some(handle) = self.driver.take() {
            handle.abort();
        }
    }
}

impl Drop for TimerRuntime {
    fn drop(&mut self) {
        self.cancel_driver();
    }
}
