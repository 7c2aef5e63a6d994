//! # RFID tag events
//!
//! The motor-control peripheral reports tag reads as serial lines of the form
//! `RFID:<hex-uid>`. The peripheral stops the motors itself on any tag read,
//! so the controller only has to decide whether the tag is the one it was
//! waiting for.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::fmt;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Prefix of a tag read line from the peripheral.
pub const TAG_LINE_PREFIX: &str = "RFID:";

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// UID of a physical RFID tag.
///
/// UIDs are normalised to lowercase on construction so comparisons never
/// depend on the casing a particular reader firmware emits.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq, Hash)]
pub struct TagUid(String);

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl TagUid {
    pub fn new<S: AsRef<str>>(uid: S) -> Self {
        TagUid(uid.as_ref().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TagUid {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Parse a serial line into a tag UID, or `None` if the line is not a tag
/// read event (the peripheral also emits boot and debug chatter).
pub fn parse_tag_line(line: &str) -> Option<TagUid> {
    let line = line.trim();

    if let Some(uid) = line.strip_prefix(TAG_LINE_PREFIX) {
        if uid.is_empty() {
            None
        } else {
            Some(TagUid::new(uid))
        }
    } else {
        None
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
