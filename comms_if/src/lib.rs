//! # Communications interface crate
//!
//! This crate defines every type that crosses one of the trolley's two
//! external boundaries:
//!
//! - `eqpt`: the serial link to the motor-control peripheral (drive command
//!   alphabet, line sensor readings, RFID tag events).
//! - `store`: the remote request/confirmation store (requests, carts, status
//!   reporting, confirmation flags, registry lookups).
//!
//! Keeping these in one crate means the executable, the simulator and any
//! ground-side tooling all agree on the wire contract.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Equipment interface - types exchanged with the motor-control peripheral
pub mod eqpt;

/// Store interface - types exchanged with the remote request store
pub mod store;
