//! # Motor-control peripheral commands
//!
//! The peripheral accepts single-byte commands over the serial link and
//! executes them until the next command arrives. No acknowledgement is sent
//! back for a command, so all sends are fire-and-forget.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A command understood by the motor-control peripheral.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Eq, PartialEq, Hash)]
pub enum DriveCmd {
    /// Drive forward at cruise speed
    Forward,

    /// Drive backward at cruise speed
    Backward,

    /// Stop both motors
    Stop,

    /// Pivot turn to the left
    TurnLeft,

    /// Pivot turn to the right
    TurnRight,

    /// Slight steering correction to the left
    VeerLeft,

    /// Slight steering correction to the right
    VeerRight,
}

/// Direction of a pivot turn.
#[derive(Debug, Serialize, Deserialize, Copy, Clone, Eq, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TurnDirection {
    Left,
    Right,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl DriveCmd {
    /// Get the byte transmitted over the serial link for this command.
    pub fn as_byte(&self) -> u8 {
        match self {
            DriveCmd::Forward => b'F',
            DriveCmd::Backward => b'B',
            DriveCmd::Stop => b'S',
            DriveCmd::TurnLeft => b'L',
            DriveCmd::TurnRight => b'R',
            DriveCmd::VeerLeft => b'M',
            DriveCmd::VeerRight => b'N',
        }
    }

    /// Parse a command byte back into a `DriveCmd`, or `None` if the byte is
    /// not part of the command alphabet.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'F' => Some(DriveCmd::Forward),
            b'B' => Some(DriveCmd::Backward),
            b'S' => Some(DriveCmd::Stop),
            b'L' => Some(DriveCmd::TurnLeft),
            b'R' => Some(DriveCmd::TurnRight),
            b'M' => Some(DriveCmd::VeerLeft),
            b'N' => Some(DriveCmd::VeerRight),
            _ => None,
        }
    }
}

impl TurnDirection {
    /// Get the pivot command for this direction.
    pub fn cmd(&self) -> DriveCmd {
        match self {
            TurnDirection::Left => DriveCmd::TurnLeft,
            TurnDirection::Right => DriveCmd::TurnRight,
        }
    }
}

impl fmt::Display for TurnDirection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TurnDirection::Left => write!(f, "left"),
            TurnDirection::Right => write!(f, "right"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_byte_round_trip() {
        let cmds = [
            DriveCmd::Forward,
            DriveCmd::Backward,
            DriveCmd::Stop,
            DriveCmd::TurnLeft,
            DriveCmd::TurnRight,
            DriveCmd::VeerLeft,
            DriveCmd::VeerRight,
        ];

        for cmd in cmds.iter() {
            assert_eq!(DriveCmd::from_byte(cmd.as_byte()), Some(*cmd));
        }

        assert_eq!(DriveCmd::from_byte(b'X'), None);
    }
}
