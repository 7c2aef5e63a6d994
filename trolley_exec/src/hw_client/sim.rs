//! Simulated hardware backend
//!
//! A scriptable [`HardwareIo`] implementation: sensor frames and serial lines
//! are queued up front, every command sent to the motor peripheral is
//! recorded. The test suite drives complete trips through it, and it is the
//! fallback interface on hosts that are not the trolley.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::collections::VecDeque;

// Internal
use super::{HardwareIo, HwClientError};
use comms_if::eqpt::line::LineReading;
use comms_if::eqpt::mech::DriveCmd;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Simulated trolley hardware.
pub struct SimHardware {
    /// Scripted sensor frames, popped one per read
    sensor_frames: VecDeque<LineReading>,

    /// Frame returned once the script is exhausted
    idle_frame: LineReading,

    /// Scripted serial lines, popped one per receive
    serial_lines: VecDeque<String>,

    /// Every command sent to the peripheral, in order
    commands: Vec<DriveCmd>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SimHardware {
    /// Create a simulator which reads as centered on the line.
    pub fn new() -> Self {
        Self {
            sensor_frames: VecDeque::new(),
            idle_frame: LineReading::centered(),
            serial_lines: VecDeque::new(),
            commands: Vec::new(),
        }
    }

    /// Set the frame returned once the scripted frames run out.
    pub fn set_idle_frame(&mut self, frame: LineReading) {
        self.idle_frame = frame;
    }

    /// Queue sensor frames to be returned by subsequent reads.
    pub fn queue_sensor_frames<I: IntoIterator<Item = LineReading>>(&mut self, frames: I) {
        self.sensor_frames.extend(frames);
    }

    /// Queue a serial line from the peripheral.
    pub fn queue_serial_line<S: AsRef<str>>(&mut self, line: S) {
        self.serial_lines.push_back(line.as_ref().to_string());
    }

    /// All commands sent so far.
    pub fn commands(&self) -> &[DriveCmd] {
        &self.commands
    }

    /// The last command sent, if any.
    pub fn last_command(&self) -> Option<DriveCmd> {
        self.commands.last().copied()
    }
}

impl Default for SimHardware {
    fn default() -> Self {
        Self::new()
    }
}

impl HardwareIo for SimHardware {
    fn read_sensors(&mut self) -> LineReading {
        self.sensor_frames.pop_front().unwrap_or(self.idle_frame)
    }

    fn send_command(&mut self, cmd: DriveCmd) -> Result<(), HwClientError> {
        self.commands.push(cmd);
        Ok(())
    }

    fn receive_line(&mut self) -> Option<String> {
        self.serial_lines.pop_front()
    }
}
