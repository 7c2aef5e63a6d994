//! # Hardware Client
//!
//! Boundary to the trolley's physical equipment: the three infrared line
//! sensors on GPIO and the serial link to the motor-control peripheral.
//! Everything above this module works in terms of [`HardwareIo`], so the
//! control logic runs identically against the real trolley and against the
//! simulated hardware used by the test suite.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Parameters for the hardware interfaces
pub mod params;

/// Raspberry Pi GPIO + UART backend
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub mod rpi;

/// Simulated hardware backend
pub mod sim;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::warn;
use thiserror::Error;

// Internal
use comms_if::eqpt::line::LineReading;
use comms_if::eqpt::mech::DriveCmd;

// Re-exports
#[cfg(all(target_arch = "arm", target_os = "linux"))]
pub use rpi::RpiHardware;
pub use sim::SimHardware;

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Access to the trolley's sensors and motor peripheral.
pub trait HardwareIo {
    /// Instantaneous reading of the three line sensors.
    ///
    /// Must not block. On a read failure implementations substitute the safe
    /// all-off-line reading, which downstream logic treats as a lost line.
    fn read_sensors(&mut self) -> LineReading;

    /// Transmit a command byte to the motor peripheral. Fire-and-forget, no
    /// acknowledgement is awaited.
    fn send_command(&mut self, cmd: DriveCmd) -> Result<(), HwClientError>;

    /// Non-blocking check for a complete line from the peripheral.
    fn receive_line(&mut self) -> Option<String>;
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum HwClientError {
    #[error("GPIO error: {0}")]
    GpioError(String),

    #[error("Serial error: {0}")]
    SerialError(String),
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Send a command, logging rather than propagating a serial failure.
///
/// Serial write failures are transient: the control loops keep polling and a
/// persistent fault surfaces as the enclosing operation's timeout.
pub fn send_best_effort<H: HardwareIo>(hw: &mut H, cmd: DriveCmd) {
    if let Err(e) = hw.send_command(cmd) {
        warn!("Could not send {:?} to the motor peripheral: {}", cmd, e);
    }
}
