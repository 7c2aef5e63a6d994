//! Parameters for the trolley executable

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters governing the executable's request loop.
#[derive(Debug, Default, Deserialize)]
pub struct TrolleyExecParams {
    /// Time between polls of the request source when no request is pending.
    ///
    /// Units: seconds
    pub request_poll_interval_s: f64,
}

/// The node and inventory registries seeded into the store at startup.
#[derive(Debug, Default, Deserialize)]
pub struct RegistryParams {
    /// Node name to expected RFID tag UID.
    pub nodes: BTreeMap<String, String>,

    /// Product id to human-readable product name.
    pub products: BTreeMap<String, String>,
}
