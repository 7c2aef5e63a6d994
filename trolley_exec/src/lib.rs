//! # Trolley library.
//!
//! This library allows other crates in the workspace (and the integration
//! tests) to access items defined inside the trolley crate.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Hardware client - line sensors and the serial link to the motor peripheral
pub mod hw_client;

/// Line follower - classifies sensor readings into steering verdicts
pub mod line_follower;

/// Node navigator - drives the trolley between topology nodes
pub mod nav;

/// Parameters for the executable itself
pub mod params;

/// Store client - implementations of the request store interface
pub mod store_client;

/// Store topology - nodes, the product catalogue and the transition policy
pub mod topo;

/// Itinerary sequencer - runs complete shopping trips
pub mod trip;

/// Turn executor - drives single pivot turns
pub mod turn_exec;
