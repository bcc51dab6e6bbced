//! Timer engine implementation.
//!
//! The engine is a monotonic-deadline state machine. It owns no tasks --
//! a runtime driver (or a test) calls `recompute_remaining()` periodically.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running -> (Paused | Finished)
//! Paused -> Running
//! Finished -> Paused      (toggle / scrub)
//! any -> Idle             (reset)
//! ```
//!
//! While running, the source of truth for remaining time is an absolute
//! deadline on the injected monotonic clock. Every recompute derives the
//! value fresh from `deadline - now`, so delayed or skipped periodic calls
//! can never accumulate drift.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::error;

use super::clock::MonotonicClock;
use super::zone::{zone_for_remaining, Zone};
use crate::events::Event;
use crate::feedback::{AlertScheduler, FinishSink, NullFeedback, ZoneTransitionSink};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerStatus {
    Idle,
    Running,
    Paused,
    Finished,
}

impl std::fmt::Display for TimerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TimerStatus::Idle => "idle",
            TimerStatus::Running => "running",
            TimerStatus::Paused => "paused",
            TimerStatus::Finished => "finished",
        };
        f.write_str(name)
    }
}

/// Validated timer durations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    total_secs: u32,
    yellow_threshold_secs: u32,
    red_threshold_secs: u32,
}

impl TimerConfig {
    /// Build a config, enforcing `red <= yellow <= total` the same way the
    /// settings surface does: yellow is capped to the total, then red is
    /// capped to yellow. The total is floored at one second.
    pub fn new(total_secs: u32, yellow_threshold_secs: u32, red_threshold_secs: u32) -> Self {
        let total = total_secs.max(1);
        let yellow = yellow_threshold_secs.min(total);
        let red = red_threshold_secs.min(yellow);
        Self {
            total_secs: total,
            yellow_threshold_secs: yellow,
            red_threshold_secs: red,
        }
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn yellow_threshold_secs(&self) -> u32 {
        self.yellow_threshold_secs
    }

    pub fn red_threshold_secs(&self) -> u32 {
        self.red_threshold_secs
    }
}

impl Default for TimerConfig {
    /// 20 minutes of talk time, yellow at 5 minutes remaining, red at 2.
    fn default() -> Self {
        Self::new(20 * 60, 5 * 60, 2 * 60)
    }
}

/// Core timer engine.
///
/// Single owner, synchronous operations; the caller serializes access.
/// Collaborators (zone-transition sink, finish sink, alert scheduler) are
/// injected capabilities and never influence engine state.
pub struct TimerEngine {
    config: TimerConfig,
    status: TimerStatus,
    remaining_secs: u32,
    /// Monotonic reading at which the countdown reaches zero.
    /// Present iff `status == Running`.
    deadline: Option<Duration>,
    zone: Zone,
    /// White phase of the finish flash. Only meaningful while finished.
    flash_white: bool,
    clock: Arc<dyn MonotonicClock>,
    zone_sink: Arc<dyn ZoneTransitionSink>,
    finish_sink: Arc<dyn FinishSink>,
    alerts: Arc<dyn AlertScheduler>,
}

impl TimerEngine {
    /// Engine with no-op collaborators.
    pub fn new(config: TimerConfig, clock: Arc<dyn MonotonicClock>) -> Self {
        let feedback = Arc::new(NullFeedback);
        Self::with_feedback(config, clock, feedback.clone(), feedback.clone(), feedback)
    }

    /// Engine with injected collaborator capabilities.
    pub fn with_feedback(
        config: TimerConfig,
        clock: Arc<dyn MonotonicClock>,
        zone_sink: Arc<dyn ZoneTransitionSink>,
        finish_sink: Arc<dyn FinishSink>,
        alerts: Arc<dyn AlertScheduler>,
    ) -> Self {
        let remaining_secs = config.total_secs();
        let zone = zone_for_remaining(
            remaining_secs,
            config.yellow_threshold_secs(),
            config.red_threshold_secs(),
        );
        Self {
            config,
            status: TimerStatus::Idle,
            remaining_secs,
            deadline: None,
            zone,
            flash_white: false,
            clock,
            zone_sink,
            finish_sink,
            alerts,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn flash_white(&self) -> bool {
        self.flash_white
    }

    pub fn config(&self) -> TimerConfig {
        self.config
    }

    /// Remaining time as `M:SS`.
    pub fn display_text(&self) -> String {
        format_remaining(self.remaining_secs)
    }

    /// Build a full state snapshot event.
    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            status: self.status,
            zone: self.zone,
            remaining_secs: self.remaining_secs,
            total_secs: self.config.total_secs(),
            display: self.display_text(),
            flash_white: self.flash_white,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Idle | TimerStatus::Paused => {
                self.status = TimerStatus::Running;
                self.stop_flashing();
                self.deadline =
                    Some(self.clock.now() + Duration::from_secs(u64::from(self.remaining_secs)));
                Some(Event::TimerStarted {
                    remaining_secs: self.remaining_secs,
                    total_secs: self.config.total_secs(),
                    at: Utc::now(),
                })
            }
            // Already running: the periodic driver must not be doubled.
            // Finished is exited through toggle/scrub/reset.
            TimerStatus::Running | TimerStatus::Finished => None,
        }
    }

    pub fn pause(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Running => {
                // Capture an accurate remaining time before stopping.
                self.recompute_remaining();
                self.status = TimerStatus::Paused;
                self.deadline = None;
                self.stop_flashing();
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            TimerStatus::Finished => {
                // Toggle flow: stop the finish flash and hold at zero.
                self.stop_flashing();
                self.deadline = None;
                self.status = TimerStatus::Paused;
                Some(Event::TimerPaused {
                    remaining_secs: self.remaining_secs,
                    at: Utc::now(),
                })
            }
            _ => None,
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.status = TimerStatus::Idle;
        self.deadline = None;
        self.stop_flashing();
        self.set_remaining(self.config.total_secs());
        Some(Event::TimerReset { at: Utc::now() })
    }

    /// Replace the configuration and perform a full reset.
    pub fn configure(&mut self, config: TimerConfig) -> Option<Event> {
        self.config = config;
        self.reset()
    }

    /// The single play/pause control.
    pub fn toggle(&mut self) -> Option<Event> {
        match self.status {
            TimerStatus::Idle | TimerStatus::Paused => self.start(),
            TimerStatus::Running | TimerStatus::Finished => self.pause(),
        }
    }

    /// User-driven seek. The value is clamped to `[0, total]`.
    pub fn scrub(&mut self, new_remaining_secs: u32) -> Option<Event> {
        let clamped = new_remaining_secs.min(self.config.total_secs());

        match self.status {
            TimerStatus::Running => {
                // Rebase the deadline so the countdown continues from the
                // user's chosen position.
                self.deadline =
                    Some(self.clock.now() + Duration::from_secs(u64::from(clamped)));
                self.set_remaining(clamped);
                if clamped == 0 {
                    self.transition_to_finished();
                }
            }
            TimerStatus::Finished => {
                // User is adjusting time after completion; stop flashing
                // and move to a paused state.
                self.stop_flashing();
                self.deadline = None;
                self.status = TimerStatus::Paused;
                self.set_remaining(clamped);
            }
            TimerStatus::Paused | TimerStatus::Idle => {
                self.set_remaining(clamped);
            }
        }

        Some(Event::TimerScrubbed {
            remaining_secs: self.remaining_secs,
            status: self.status,
            at: Utc::now(),
        })
    }

    /// Recompute remaining time from the absolute deadline.
    ///
    /// The only place remaining time is derived while running: no per-tick
    /// deltas are accumulated, so arbitrarily delayed or skipped periodic
    /// calls self-correct here with no drift. Fractional seconds round up,
    /// keeping the display from showing zero while real time remains.
    ///
    /// Returns the finish event when the countdown reaches zero.
    pub fn recompute_remaining(&mut self) -> Option<Event> {
        if self.status != TimerStatus::Running {
            return None;
        }
        let Some(deadline) = self.deadline else {
            // Invariant violation: running with no deadline.
            error!("timer is running but has no deadline; pausing to recover");
            self.force_pause();
            return None;
        };

        let secs_left = deadline.saturating_sub(self.clock.now()).as_secs_f64();
        let new_remaining = secs_left.ceil() as u32;

        if new_remaining != self.remaining_secs {
            self.set_remaining(new_remaining);
        }

        if new_remaining == 0 {
            self.transition_to_finished();
            return Some(Event::TimerFinished { at: Utc::now() });
        }
        None
    }

    /// Alternate the finish flash phase. Driven on a fixed interval while
    /// finished; skipped ticks only mean fewer visible flashes.
    pub fn toggle_flash(&mut self) {
        if self.status == TimerStatus::Finished {
            self.flash_white = !self.flash_white;
        }
    }

    // ── Suspension hooks ─────────────────────────────────────────────

    /// Entering background: capture an accurate remaining time, then hand
    /// the numeric triggers to the alert scheduler so the user still gets
    /// warnings while the process may not be executing.
    pub fn handle_suspend(&mut self) {
        if self.status != TimerStatus::Running {
            return;
        }
        self.recompute_remaining();
        self.alerts.schedule_alerts(
            self.remaining_secs,
            self.config.yellow_threshold_secs(),
            self.config.red_threshold_secs(),
        );
    }

    /// Returning to foreground: live display supersedes any scheduled
    /// alerts. If still running, remaining time snaps to the deadline.
    ///
    /// Returns the finish event when the deadline passed while suspended.
    pub fn handle_resume(&mut self) -> Option<Event> {
        self.alerts.cancel_all_alerts();
        if self.status != TimerStatus::Running {
            return None;
        }
        self.recompute_remaining()
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Set remaining time and synchronously re-derive the zone, signalling
    /// the transition sink on any change away from the baseline zone.
    fn set_remaining(&mut self, secs: u32) {
        self.remaining_secs = secs;
        self.update_zone();
    }

    fn update_zone(&mut self) {
        let previous = self.zone;
        self.zone = zone_for_remaining(
            self.remaining_secs,
            self.config.yellow_threshold_secs(),
            self.config.red_threshold_secs(),
        );
        if self.zone != previous && self.zone != Zone::Black {
            self.zone_sink.zone_transition();
        }
    }

    /// Idempotent: repeated calls while already finished are no-ops, so the
    /// finish signal fires exactly once per run-to-completion.
    fn transition_to_finished(&mut self) {
        if self.status == TimerStatus::Finished {
            return;
        }
        self.status = TimerStatus::Finished;
        self.deadline = None;
        self.flash_white = false;
        self.finish_sink.finished();
    }

    fn stop_flashing(&mut self) {
        self.flash_white = false;
    }

    fn force_pause(&mut self) {
        self.status = TimerStatus::Paused;
        self.deadline = None;
        self.stop_flashing();
    }
}

/// Format remaining seconds as `M:SS` (minutes unpadded, seconds
/// zero-padded to two digits).
pub fn format_remaining(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;

    fn engine(total: u32, yellow: u32, red: u32) -> (TimerEngine, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let engine = TimerEngine::new(TimerConfig::new(total, yellow, red), clock.clone());
        (engine, clock)
    }

    #[test]
    fn display_text_formatting() {
        assert_eq!(format_remaining(0), "0:00");
        assert_eq!(format_remaining(305), "5:05");
        assert_eq!(format_remaining(5999), "99:59");
    }

    #[test]
    fn initial_state_is_idle_with_full_time() {
        let (engine, _) = engine(600, 300, 120);
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 600);
        assert_eq!(engine.zone(), Zone::Black);
    }

    #[test]
    fn toggle_cycles_idle_running_paused() {
        let (mut engine, _) = engine(600, 300, 120);

        assert!(engine.toggle().is_some());
        assert_eq!(engine.status(), TimerStatus::Running);

        assert!(engine.toggle().is_some());
        assert_eq!(engine.status(), TimerStatus::Paused);

        assert!(engine.toggle().is_some());
        assert_eq!(engine.status(), TimerStatus::Running);
    }

    #[test]
    fn start_while_running_is_a_no_op() {
        let (mut engine, clock) = engine(600, 300, 120);
        assert!(engine.start().is_some());
        clock.advance_secs(5);
        assert!(engine.start().is_none());
        engine.recompute_remaining();
        assert_eq!(engine.remaining_secs(), 595);
    }

    #[test]
    fn fractional_seconds_round_up() {
        let (mut engine, clock) = engine(600, 300, 120);
        engine.start();
        clock.advance(std::time::Duration::from_millis(11_200));
        engine.recompute_remaining();
        // 588.8s left rounds up to 589: never show less time than remains.
        assert_eq!(engine.remaining_secs(), 589);
    }

    #[test]
    fn running_without_deadline_recovers_by_pausing() {
        let (mut engine, _) = engine(600, 300, 120);
        engine.start();
        engine.deadline = None;
        assert!(engine.recompute_remaining().is_none());
        assert_eq!(engine.status(), TimerStatus::Paused);
    }

    #[test]
    fn configure_applies_and_resets() {
        let (mut engine, clock) = engine(600, 300, 120);
        engine.start();
        clock.advance_secs(30);
        engine.recompute_remaining();

        engine.configure(TimerConfig::new(120, 60, 30));
        assert_eq!(engine.status(), TimerStatus::Idle);
        assert_eq!(engine.remaining_secs(), 120);
        assert_eq!(engine.config().yellow_threshold_secs(), 60);
    }

    #[test]
    fn config_clamps_threshold_ordering() {
        let config = TimerConfig::new(100, 500, 700);
        assert_eq!(config.total_secs(), 100);
        assert_eq!(config.yellow_threshold_secs(), 100);
        assert_eq!(config.red_threshold_secs(), 100);

        let config = TimerConfig::new(0, 0, 0);
        assert_eq!(config.total_secs(), 1);
    }

    #[test]
    fn flash_toggles_only_while_finished() {
        let (mut engine, clock) = engine(2, 1, 1);
        engine.toggle_flash();
        assert!(!engine.flash_white());

        engine.start();
        clock.advance_secs(5);
        engine.recompute_remaining();
        assert_eq!(engine.status(), TimerStatus::Finished);

        engine.toggle_flash();
        assert!(engine.flash_white());
        engine.toggle_flash();
        assert!(!engine.flash_white());
    }
}
