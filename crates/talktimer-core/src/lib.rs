//! # TalkTimer Core Library
//!
//! Core logic for the TalkTimer presentation countdown. CLI-first: every
//! operation is available through the standalone CLI binary, and any GUI
//! front end is a thin layer over this same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: a monotonic-deadline state machine; a runtime driver
//!   periodically asks it to recompute remaining time, and delayed or
//!   skipped ticks self-correct with no accumulated drift
//! - **Zones**: pure classification of remaining time into urgency zones
//!   (black, yellow, red, flashing)
//! - **Feedback**: capability interfaces for haptic/sound/alert
//!   collaborators, injected so the state machine tests in isolation
//! - **Storage**: TOML-based configuration of durations and thresholds
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: core countdown state machine
//! - [`TimerRuntime`]: cancellable periodic driver on tokio
//! - [`zone_for_remaining`]: remaining-time classification
//! - [`Config`]: application configuration management

pub mod error;
pub mod events;
pub mod feedback;
pub mod storage;
pub mod timer;

pub use error::{ConfigError, CoreError};
pub use events::Event;
pub use feedback::{
    alert_delays, AlertDelays, AlertScheduler, FinishSink, NullFeedback, ZoneTransitionSink,
};
pub use storage::Config;
pub use timer::{
    format_remaining, zone_for_remaining, ManualClock, MonotonicClock, SystemClock, TimerConfig,
    TimerEngine, TimerRuntime, TimerStatus, Zone,
};
