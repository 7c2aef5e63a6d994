//! # Line follower
//!
//! Classifies an instantaneous three-sensor reading into a steering verdict.
//! This is a stateless pure function, shared by the turn executor (to detect
//! turn completion) and the navigator (continuous correction).
//!
//! Sensor polarity is already normalised at the hardware boundary, so the
//! classifier only sees [`SensorState`] values. An all-on reading (the
//! trolley sitting across a junction marking or an extra-wide section of
//! line) is treated as `Centered` rather than as a junction event, which
//! avoids needless oscillation on the painted junction boxes of the store
//! floor.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::line::{LineReading, SensorState};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Steering verdict for a line reading.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LineState {
    /// On the line, keep driving forward
    Centered,

    /// Drifted right of the line, steer left to recover
    VeerLeft,

    /// Drifted left of the line, steer right to recover
    VeerRight,

    /// No sensor can see the line
    Lost,
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Classify a sensor reading into a steering verdict.
pub fn classify(reading: &LineReading) -> LineState {
    use SensorState::{OffLine, OnLine};

    match (reading.left, reading.center, reading.right) {
        // Nominal tracking
        (OffLine, OnLine, OffLine) => LineState::Centered,

        // Line showing on the right sensor: drifted right, pull back left
        (OffLine, OnLine, OnLine) => LineState::VeerLeft,
        (OffLine, OffLine, OnLine) => LineState::VeerLeft,

        // Line showing on the left sensor: drifted left, pull back right
        (OnLine, OnLine, OffLine) => LineState::VeerRight,
        (OnLine, OffLine, OffLine) => LineState::VeerRight,

        // Junction marking or wide line under all three sensors
        (OnLine, OnLine, OnLine) => LineState::Centered,

        // No line anywhere
        (OffLine, OffLine, OffLine) => LineState::Lost,

        // Outer sensors without the center should not occur with correct
        // sensor spacing, classify as lost rather than guessing a direction
        (OnLine, OffLine, OnLine) => LineState::Lost,
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn reading(left: u8, center: u8, right: u8) -> LineReading {
        let s = |bit: u8| match bit {
            0 => SensorState::OnLine,
            _ => SensorState::OffLine,
        };

        LineReading::new(s(left), s(center), s(right))
    }

    /// Every one of the 8 possible readings maps to exactly one verdict.
    #[test]
    fn test_classifier_is_total() {
        for bits in 0..8u8 {
            let r = reading((bits >> 2) & 1, (bits >> 1) & 1, bits & 1);

            // No panic, and the verdict is one of the four defined states
            match classify(&r) {
                LineState::Centered
                | LineState::VeerLeft
                | LineState::VeerRight
                | LineState::Lost => (),
            }
        }
    }

    #[test]
    fn test_canonical_mapping() {
        // 0 = on line (dark), 1 = off line (light)
        assert_eq!(classify(&reading(1, 0, 1)), LineState::Centered);
        assert_eq!(classify(&reading(1, 0, 0)), LineState::VeerLeft);
        assert_eq!(classify(&reading(1, 1, 0)), LineState::VeerLeft);
        assert_eq!(classify(&reading(0, 0, 1)), LineState::VeerRight);
        assert_eq!(classify(&reading(0, 1, 1)), LineState::VeerRight);
        assert_eq!(classify(&reading(0, 0, 0)), LineState::Centered);
        assert_eq!(classify(&reading(1, 1, 1)), LineState::Lost);
        assert_eq!(classify(&reading(0, 1, 0)), LineState::Lost);
    }

    #[test]
    fn test_safe_default_reads_as_lost() {
        assert_eq!(classify(&LineReading::off_line()), LineState::Lost);
    }
}
