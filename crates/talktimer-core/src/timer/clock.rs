//! Monotonic time source abstraction.
//!
//! The countdown must never read wall-clock time: changes to the system
//! clock, timezone, or NTP adjustments would skew the deadline. Everything
//! in the engine is expressed as readings from this capability.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// A monotonic clock expressed as a reading since an arbitrary origin.
///
/// Readings are non-decreasing and keep advancing while the process is
/// suspended. The clock is read-only and may be shared freely across
/// engine instances.
pub trait MonotonicClock: Send + Sync {
    /// Current reading from the clock's origin.
    fn now(&self) -> Duration;
}

/// Real clock backed by `std::time::Instant`.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually-advanced clock for deterministic tests.
///
/// `now()` only moves when `advance` is called, so scenarios like "12
/// seconds pass with no intermediate ticks" can be expressed exactly.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_ms: AtomicU64,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now_ms
            .fetch_add(by.as_millis() as u64, Ordering::SeqCst);
    }

    pub fn advance_secs(&self, secs: u64) {
        self.advance(Duration::from_secs(secs));
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.now_ms.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_only_on_demand() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), Duration::ZERO);
        clock.advance_secs(12);
        assert_eq!(clock.now(), Duration::from_secs(12));
        clock.advance(Duration::from_millis(500));
        assert_eq!(clock.now(), Duration::from_millis(12_500));
    }

    #[test]
    fn system_clock_is_non_decreasing() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
