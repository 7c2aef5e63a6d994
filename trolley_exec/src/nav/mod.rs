//! Node navigator module
//!
//! Owns the trolley's belief about which waypoint it is at and drives it
//! between nodes, combining continuous line correction with RFID-based
//! arrival detection. Position only ever advances on a confirmed tag match,
//! so a drifting trolley gets stuck at its last confirmed node rather than
//! silently believing it is somewhere it is not.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::*;
pub use state::*;
