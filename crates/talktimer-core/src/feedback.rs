//! Capability interfaces for the engine's external collaborators.
//!
//! Haptics, sound, and local-alert scheduling are platform services. The
//! engine only signals them and never waits on them; implementations catch
//! and log their own failures. Each capability is injected at engine
//! construction so the state machine can be tested with no-op doubles.

/// Consumer of zone-change signals.
///
/// Invoked when the zone changes to anything other than the baseline
/// (black) zone, at most once per actual change.
pub trait ZoneTransitionSink: Send + Sync {
    fn zone_transition(&self);
}

/// Consumer of the run-to-completion signal, fired exactly once per finish.
pub trait FinishSink: Send + Sync {
    fn finished(&self);
}

/// Schedules local alerts for the threshold and finish triggers so the user
/// still gets warnings while the process may not be executing.
pub trait AlertScheduler: Send + Sync {
    fn schedule_alerts(&self, remaining_secs: u32, yellow_threshold_secs: u32, red_threshold_secs: u32);
    fn cancel_all_alerts(&self);
}

/// No-op implementation of every feedback capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullFeedback;

impl ZoneTransitionSink for NullFeedback {
    fn zone_transition(&self) {}
}

impl FinishSink for NullFeedback {
    fn finished(&self) {}
}

impl AlertScheduler for NullFeedback {
    fn schedule_alerts(&self, _remaining_secs: u32, _yellow_threshold_secs: u32, _red_threshold_secs: u32) {}
    fn cancel_all_alerts(&self) {}
}

/// Relative delays, in seconds, for the three background alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertDelays {
    pub to_yellow: Option<u32>,
    pub to_red: Option<u32>,
    pub to_finish: Option<u32>,
}

/// Derive alert delays from the reported remaining time and thresholds.
///
/// A delay is absent when its trigger is already in the past at scheduling
/// time (the zone is already showing, or the timer has already finished).
pub fn alert_delays(remaining_secs: u32, yellow_threshold_secs: u32, red_threshold_secs: u32) -> AlertDelays {
    AlertDelays {
        to_yellow: remaining_secs
            .checked_sub(yellow_threshold_secs)
            .filter(|d| *d > 0),
        to_red: remaining_secs
            .checked_sub(red_threshold_secs)
            .filter(|d| *d > 0),
        to_finish: Some(remaining_secs).filter(|d| *d > 0),
    }
}
