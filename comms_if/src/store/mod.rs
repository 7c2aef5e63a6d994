//! # Request store interface
//!
//! The trolley coordinates with its users through a remote key-value store:
//! shopping requests arrive through it, carts are persisted in it, human
//! confirmations are flagged in it and the trolley reports its status into
//! it. This module defines the abstract [`RequestStore`] trait plus every
//! type that crosses that boundary.
//!
//! The status strings produced by [`Status`] are an external contract:
//! dashboards key off these exact patterns, so they are only ever produced
//! through the enum and are pinned by test.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Shopping request parsing
pub mod request;

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

// Internal
use crate::eqpt::mech::TurnDirection;
use crate::eqpt::rfid::TagUid;

// Re-exports
pub use request::{RequestAction, RequestParseError, TrolleyRequest};

// ------------------------------------------------------------------------------------------------
// TYPES
// ------------------------------------------------------------------------------------------------

/// A shopping cart: product id to requested quantity.
///
/// A `BTreeMap` so iteration order over product ids is deterministic.
pub type Cart = BTreeMap<ProductId, i64>;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Identifier of a product in the store inventory.
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(transparent)]
pub struct ProductId(String);

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The two human confirmation gates of a shopping trip.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ConfirmationKind {
    /// The user confirmed the item currently presented was added to the
    /// basket
    Item,

    /// The user confirmed the trolley may return home
    Home,
}

/// Errors raised by a request store backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("The store backend is not available")]
    NotAvailable,

    #[error("Store backend error: {0}")]
    Backend(String),
}

/// Trolley status reported to the store.
///
/// `Display` produces the stable external telemetry strings.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Status {
    ProcessingList,
    ProcessingRow(u8),
    MovingTo(String),
    MovingToProduct(String),
    ReversingTo(String),
    ArrivedAt(String),
    WaitingForItem(ProductId, String),
    ItemAdded(ProductId),
    WaitingForHomeConfirmation,
    ReturningHome,
    Completed,
    CompletedEmptyCart,
    NoUid(String),
    TurnTimeout(TurnDirection),
    NavTimeout { from: String, to: String },
    ReverseTimeout { from: String, to: String },
    LineLost,
    ItemConfirmationFailed(ProductId),
    HomeConfirmationFailed,
    InvalidRequestFormat,
    CriticalProcessingError,
}

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Abstract interface to the remote request/confirmation store.
///
/// Implementations take `&self` and handle their own synchronisation, so a
/// single store handle can be shared between the control thread and whatever
/// feeds requests into it.
pub trait RequestStore {
    /// Pop the next pending shopping request, if any. Must not block.
    fn next_request(&self) -> Result<Option<TrolleyRequest>, StoreError>;

    /// Report the trolley's status for a request.
    fn update_status(&self, request_id: &str, status: &Status) -> Result<(), StoreError>;

    /// Get the persisted cart for a request. An absent cart is empty.
    fn get_cart(&self, request_id: &str) -> Result<Cart, StoreError>;

    /// Persist the cart for a request.
    fn set_cart(&self, request_id: &str, cart: &Cart) -> Result<(), StoreError>;

    /// Look up the RFID tag UID expected at the named node.
    fn get_expected_uid(&self, node_name: &str) -> Result<Option<TagUid>, StoreError>;

    /// Look up the human-readable name of a product.
    fn get_product_name(&self, product_id: &ProductId) -> Result<Option<String>, StoreError>;

    /// Read a confirmation flag.
    fn get_confirmation(
        &self,
        request_id: &str,
        kind: ConfirmationKind,
    ) -> Result<bool, StoreError>;

    /// Reset a confirmation flag to false.
    fn reset_confirmation(&self, request_id: &str, kind: ConfirmationKind)
        -> Result<(), StoreError>;

    /// Mark or unmark a request as being processed.
    fn set_processing(&self, request_id: &str, processing: bool) -> Result<(), StoreError>;

    /// Check whether a request is already being processed.
    fn is_processing(&self, request_id: &str) -> Result<bool, StoreError>;

    /// Wait for a confirmation flag to become true, then reset it.
    ///
    /// Polls the flag at `poll_interval` until it reads true or `timeout`
    /// elapses. Returns `Ok(true)` if the confirmation arrived in time and
    /// `Ok(false)` on timeout. The reset is best-effort: a store error while
    /// resetting is logged and does not fail the wait.
    fn wait_for_confirmation(
        &self,
        request_id: &str,
        kind: ConfirmationKind,
        timeout: Duration,
        poll_interval: Duration,
    ) -> Result<bool, StoreError> {
        let start = Instant::now();

        while start.elapsed() < timeout {
            if self.get_confirmation(request_id, kind)? {
                if let Err(e) = self.reset_confirmation(request_id, kind) {
                    warn!(
                        "Could not reset {:?} confirmation flag for {}: {}",
                        kind, request_id, e
                    );
                }
                return Ok(true);
            }

            thread::sleep(poll_interval);
        }

        Ok(false)
    }
}

// ------------------------------------------------------------------------------------------------
// FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Report a status, logging rather than propagating a store failure.
///
/// Status reporting is telemetry: a store outage must not stop the trolley
/// mid-operation, so failures are logged and the caller carries on.
pub fn report<S: RequestStore + ?Sized>(store: &S, request_id: &str, status: &Status) {
    log::info!("[status:{}] {}", request_id, status);

    if let Err(e) = store.update_status(request_id, status) {
        warn!(
            "Could not report status '{}' for {}: {}",
            status, request_id, e
        );
    }
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ProductId {
    pub fn new<S: AsRef<str>>(id: S) -> Self {
        ProductId(id.as_ref().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Status::ProcessingList => write!(f, "processing_list"),
            Status::ProcessingRow(row) => write!(f, "processing_row:{}", row),
            Status::MovingTo(node) => write!(f, "moving_to:{}", node),
            Status::MovingToProduct(node) => write!(f, "moving_to_product:{}", node),
            Status::ReversingTo(node) => write!(f, "reversing_to:{}", node),
            Status::ArrivedAt(node) => write!(f, "arrived_at:{}", node),
            Status::WaitingForItem(id, name) => write!(f, "waiting_for_item:{}:{}", id, name),
            Status::ItemAdded(id) => write!(f, "item_added:{}", id),
            Status::WaitingForHomeConfirmation => write!(f, "waiting_for_home_confirmation"),
            Status::ReturningHome => write!(f, "returning_home"),
            Status::Completed => write!(f, "completed"),
            Status::CompletedEmptyCart => write!(f, "completed_empty_cart"),
            Status::NoUid(node) => write!(f, "error:no_uid:{}", node),
            Status::TurnTimeout(dir) => write!(f, "error:turn_timeout:{}", dir),
            Status::NavTimeout { from, to } => write!(f, "error:nav_timeout:{}->{}", from, to),
            Status::ReverseTimeout { from, to } => {
                write!(f, "error:reverse_timeout:{}->{}", from, to)
            }
            Status::LineLost => write!(f, "error:line_lost"),
            Status::ItemConfirmationFailed(id) => {
                write!(f, "error:item_confirmation_failed:{}", id)
            }
            Status::HomeConfirmationFailed => write!(f, "error:home_confirmation_failed"),
            Status::InvalidRequestFormat => write!(f, "error:invalid_request_format"),
            Status::CriticalProcessingError => write!(f, "error:critical_processing_exception"),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
