//! Parameters structure for the itinerary sequencer

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use comms_if::eqpt::mech::TurnDirection;
use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for trip sequencing.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    /// Maximum time to wait for a user confirmation.
    ///
    /// Units: seconds
    pub confirmation_timeout_s: f64,

    /// Time between confirmation flag polls.
    ///
    /// Units: seconds
    pub confirmation_poll_interval_s: f64,

    /// Duration of the forward nudge at a front junction before turning
    /// into the aisle.
    ///
    /// Units: seconds
    pub junction_nudge_duration_s: f64,

    /// Pause after the nudge before the turn starts.
    ///
    /// Units: seconds
    pub junction_nudge_pause_s: f64,

    // Junction turn directions, calibrated against the store floor
    /// Turn issued at a front junction to enter the aisle.
    pub aisle_entry_turn: TurnDirection,

    /// Turn issued at a back junction when further rows remain.
    pub next_row_turn: TurnDirection,

    /// Turn issued at a front junction to face the home path.
    pub home_turn: TurnDirection,
}
