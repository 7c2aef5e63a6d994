//! # Line sensor types
//!
//! The trolley carries three downward-facing infrared sensors (left, center,
//! right). The raw GPIO levels are converted into [`SensorState`] exactly
//! once, at the hardware boundary, so no other part of the software ever
//! reasons about sensor polarity.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// State of a single line sensor.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Eq, PartialEq)]
pub enum SensorState {
    /// The sensor is over the line marking
    OnLine,

    /// The sensor is over the background surface
    OffLine,
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// An instantaneous reading of all three line sensors.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Eq, PartialEq)]
pub struct LineReading {
    pub left: SensorState,
    pub center: SensorState,
    pub right: SensorState,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SensorState {
    /// Convert a raw digital level into a sensor state.
    ///
    /// With `invert` false a low level means the sensor is over the line
    /// (dark reads low on the fitted modules). Boards wired the other way
    /// round set `invert_polarity` in the hardware parameters.
    pub fn from_level(level_high: bool, invert: bool) -> Self {
        match level_high ^ invert {
            false => SensorState::OnLine,
            true => SensorState::OffLine,
        }
    }
}

impl LineReading {
    pub fn new(left: SensorState, center: SensorState, right: SensorState) -> Self {
        Self {
            left,
            center,
            right,
        }
    }

    /// The reading substituted when the sensors cannot be read.
    ///
    /// All sensors off-line reads as a lost line downstream, which is the
    /// failure mode that stops the trolley rather than letting it wander.
    pub fn off_line() -> Self {
        Self {
            left: SensorState::OffLine,
            center: SensorState::OffLine,
            right: SensorState::OffLine,
        }
    }

    /// A reading with the center sensor on the line and the outer two off it.
    pub fn centered() -> Self {
        Self {
            left: SensorState::OffLine,
            center: SensorState::OnLine,
            right: SensorState::OffLine,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
