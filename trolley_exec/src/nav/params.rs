//! Parameters structure for the navigator

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for node navigation.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct Params {
    /// Maximum time a single node-to-node navigation may take.
    ///
    /// Units: seconds
    pub navigation_timeout_s: f64,

    /// Time between iterations of the correction loop.
    ///
    /// Units: seconds
    pub poll_interval_s: f64,

    /// Pause after a confirmed arrival before control returns.
    ///
    /// Units: seconds
    pub arrival_settle_s: f64,

    /// Pause after resuming from an incorrect tag read. The tag is still
    /// under the antenna at this point and would be re-read immediately.
    ///
    /// Units: seconds
    pub wrong_tag_resume_s: f64,
}
