//! Urgency zones derived from remaining time.

use serde::{Deserialize, Serialize};

/// Display zone for the countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Black,
    Yellow,
    Red,
    Flashing,
}

/// Map remaining seconds to a zone.
///
/// Thresholds are inclusive on their own side: exactly at the red threshold
/// is already red, exactly at the yellow threshold is already yellow. Red is
/// tested before yellow, so when the thresholds are equal the yellow band
/// has zero width and the display passes straight from black to red.
pub fn zone_for_remaining(remaining_secs: u32, yellow_threshold_secs: u32, red_threshold_secs: u32) -> Zone {
    if remaining_secs == 0 {
        Zone::Flashing
    } else if remaining_secs <= red_threshold_secs {
        Zone::Red
    } else if remaining_secs <= yellow_threshold_secs {
        Zone::Yellow
    } else {
        Zone::Black
    }
}

impl Zone {
    /// ANSI background/foreground pair for terminal rendering.
    ///
    /// The flashing zone alternates between this style and
    /// [`Zone::flash_alternate_style`] once per second.
    pub fn ansi_style(self) -> &'static str {
        match self {
            Zone::Black => "\x1b[40;97m",
            Zone::Yellow => "\x1b[43;30m",
            Zone::Red | Zone::Flashing => "\x1b[41;97m",
        }
    }

    /// White-background phase of the finish flash.
    pub fn flash_alternate_style() -> &'static str {
        "\x1b[107;31m"
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Zone::Black => "black",
            Zone::Yellow => "yellow",
            Zone::Red => "red",
            Zone::Flashing => "flashing",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn threshold_boundaries_are_exact() {
        // yellow at 300, red at 120
        assert_eq!(zone_for_remaining(301, 300, 120), Zone::Black);
        assert_eq!(zone_for_remaining(300, 300, 120), Zone::Yellow);
        assert_eq!(zone_for_remaining(121, 300, 120), Zone::Yellow);
        assert_eq!(zone_for_remaining(120, 300, 120), Zone::Red);
        assert_eq!(zone_for_remaining(1, 300, 120), Zone::Red);
        assert_eq!(zone_for_remaining(0, 300, 120), Zone::Flashing);
    }

    #[test]
    fn equal_thresholds_skip_yellow() {
        assert_eq!(zone_for_remaining(121, 120, 120), Zone::Black);
        assert_eq!(zone_for_remaining(120, 120, 120), Zone::Red);
        assert_eq!(zone_for_remaining(1, 120, 120), Zone::Red);
    }

    fn urgency(zone: Zone) -> u8 {
        match zone {
            Zone::Black => 0,
            Zone::Yellow => 1,
            Zone::Red => 2,
            Zone::Flashing => 3,
        }
    }

    proptest! {
        // Urgency never decreases as the countdown runs down.
        #[test]
        fn urgency_is_monotonic(red in 0u32..600, extra in 0u32..600, remaining in 0u32..2000) {
            let yellow = red + extra;
            if remaining > 0 {
                let before = urgency(zone_for_remaining(remaining, yellow, red));
                let after = urgency(zone_for_remaining(remaining - 1, yellow, red));
                prop_assert!(after >= before);
            }
        }

        // With red == yellow, the classifier never produces yellow.
        #[test]
        fn zero_width_yellow_band(threshold in 0u32..600, remaining in 0u32..2000) {
            let zone = zone_for_remaining(remaining, threshold, threshold);
            prop_assert_ne!(zone, Zone::Yellow);
        }
    }
}
