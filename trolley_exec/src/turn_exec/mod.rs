//! Turn executor module
//!
//! Drives a single pivot turn: issue the turn command once, then watch the
//! line sensors until the trolley has rotated onto the new line.

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
