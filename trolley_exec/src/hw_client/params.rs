//! Parameters structure for the hardware client

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for the physical hardware interface.
#[derive(Debug, Default, Deserialize)]
pub struct Params {
    /// Serial device the motor peripheral is attached to.
    pub serial_port: String,

    /// Baud rate of the serial link.
    pub serial_baud: u32,

    /// BCM pin number of the left infrared sensor.
    pub ir_pin_left: u8,

    /// BCM pin number of the center infrared sensor.
    pub ir_pin_center: u8,

    /// BCM pin number of the right infrared sensor.
    pub ir_pin_right: u8,

    /// Set true if the sensor boards read high over the line.
    ///
    /// Polarity is applied once, here at the boundary; nothing downstream
    /// ever sees a raw level.
    pub invert_polarity: bool,
}
