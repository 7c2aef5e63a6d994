//! Parameters structure for the turn executor

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for turn execution.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    /// Maximum time a turn may take before it is abandoned.
    ///
    /// Units: seconds
    pub turn_timeout_s: f64,

    /// Time between sensor polls while turning.
    ///
    /// Units: seconds
    pub poll_interval_s: f64,

    /// Time the turn must have been running before a centered reading is
    /// accepted as completion.
    ///
    /// The sensors can still be over the old line just after the pivot
    /// starts, so an early centered reading does not mean the turn is done.
    ///
    /// Units: seconds
    pub min_turn_duration_s: f64,

    /// Duration of the forward push used to clear the turn zone after the
    /// new line is acquired.
    ///
    /// Units: seconds
    pub clear_zone_duration_s: f64,

    /// Pause after the clearing push before control returns to the caller.
    ///
    /// Units: seconds
    pub post_turn_pause_s: f64,
}
