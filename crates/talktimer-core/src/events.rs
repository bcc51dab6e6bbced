use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::timer::{TimerStatus, Zone};

/// Every observable engine transition produces an Event.
/// The CLI prints them; front ends poll snapshots built from the same type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        remaining_secs: u32,
        total_secs: u32,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u32,
        at: DateTime<Utc>,
    },
    TimerReset {
        at: DateTime<Utc>,
    },
    /// User repositioned the remaining time.
    TimerScrubbed {
        remaining_secs: u32,
        status: TimerStatus,
        at: DateTime<Utc>,
    },
    /// The countdown reached zero. Emitted once per run-to-completion.
    TimerFinished {
        at: DateTime<Utc>,
    },
    StateSnapshot {
        status: TimerStatus,
        zone: Zone,
        remaining_secs: u32,
        total_secs: u32,
        display: String,
        flash_white: bool,
        at: DateTime<Utc>,
    },
}
