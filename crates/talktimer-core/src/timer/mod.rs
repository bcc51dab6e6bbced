mod clock;
mod engine;
mod runtime;
mod zone;

pub use clock::{ManualClock, MonotonicClock, SystemClock};
pub use engine::{format_remaining, TimerConfig, TimerEngine, TimerStatus};
pub use runtime::TimerRuntime;
pub use zone::{zone_for_remaining, Zone};
