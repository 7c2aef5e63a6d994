//! # Equipment interface
//!
//! Types exchanged with the trolley's motor-control peripheral over the
//! serial link, plus the line sensor reading produced by the GPIO boundary.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Drive command alphabet of the motor-control peripheral
pub mod mech;

/// Line sensor states and readings
pub mod line;

/// RFID tag read events
pub mod rfid;
