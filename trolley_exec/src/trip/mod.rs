//! Itinerary sequencer module
//!
//! Orchestrates complete shopping trips: merges the requested items into the
//! persisted cart, visits the stocked rows in order, gates on the user's
//! per-item and return-home confirmations, and brings the trolley back to
//! the home dock.

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

/// Cart merging and row partitioning
pub mod cart;

mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::Serialize;

// Internal
pub use params::*;
pub use state::*;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Summary of a processed request, saved into the session directory.
#[derive(Debug, Serialize)]
pub struct TripReport {
    pub request_id: String,

    /// "completed", or a description of the failure
    pub outcome: String,

    /// Where the trolley believes it is after the trip
    pub final_node: String,

    /// Wall-clock duration of the trip
    pub duration_s: f64,
}
