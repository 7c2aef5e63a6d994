//! # Store Client
//!
//! Implementations of the [`RequestStore`] interface. The onboard software
//! only carries the in-memory store: it backs the simulator, the test suite
//! and script-driven runs. The remote database client is a thin wrapper that
//! lives with the ground-side tooling.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

// Internal
use comms_if::eqpt::rfid::TagUid;
use comms_if::store::{
    Cart, ConfirmationKind, ProductId, RequestStore, Status, StoreError, TrolleyRequest,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Shareable in-memory request store.
///
/// Clones share state, so one handle can feed requests and confirmations in
/// while the control thread consumes them.
#[derive(Clone, Default)]
pub struct MemStore {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    requests: VecDeque<TrolleyRequest>,

    /// Status history per request, newest last
    statuses: HashMap<String, Vec<String>>,

    carts: HashMap<String, Cart>,

    /// Node name to expected tag UID
    registry: HashMap<String, TagUid>,

    product_names: HashMap<ProductId, String>,

    item_confirmed: HashSet<String>,
    home_confirmed: HashSet<String>,

    processing: HashSet<String>,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend(String::from("store mutex poisoned")))
    }

    /// Register the tag UID expected at a node.
    pub fn set_expected_uid(&self, node_name: &str, uid: TagUid) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.registry.insert(node_name.to_string(), uid);
        }
    }

    /// Register a product's display name.
    pub fn set_product_name(&self, id: ProductId, name: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.product_names.insert(id, name.to_string());
        }
    }

    /// Queue a request for the control loop.
    pub fn push_request(&self, request: TrolleyRequest) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.requests.push_back(request);
        }
    }

    /// Raise the item confirmation flag for a request.
    pub fn confirm_item(&self, request_id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.item_confirmed.insert(request_id.to_string());
        }
    }

    /// Raise the home confirmation flag for a request.
    pub fn confirm_home(&self, request_id: &str) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.home_confirmed.insert(request_id.to_string());
        }
    }

    /// All statuses reported for a request, oldest first.
    pub fn status_history(&self, request_id: &str) -> Vec<String> {
        match self.inner.lock() {
            Ok(inner) => inner
                .statuses
                .get(request_id)
                .cloned()
                .unwrap_or_default(),
            Err(_) => Vec::new(),
        }
    }

    /// The most recently reported status for a request.
    pub fn current_status(&self, request_id: &str) -> Option<String> {
        match self.inner.lock() {
            Ok(inner) => inner
                .statuses
                .get(request_id)
                .and_then(|h| h.last().cloned()),
            Err(_) => None,
        }
    }
}

impl RequestStore for MemStore {
    fn next_request(&self) -> Result<Option<TrolleyRequest>, StoreError> {
        Ok(self.lock()?.requests.pop_front())
    }

    fn update_status(&self, request_id: &str, status: &Status) -> Result<(), StoreError> {
        self.lock()?
            .statuses
            .entry(request_id.to_string())
            .or_default()
            .push(status.to_string());

        Ok(())
    }

    fn get_cart(&self, request_id: &str) -> Result<Cart, StoreError> {
        Ok(self
            .lock()?
            .carts
            .get(request_id)
            .cloned()
            .unwrap_or_default())
    }

    fn set_cart(&self, request_id: &str, cart: &Cart) -> Result<(), StoreError> {
        self.lock()?
            .carts
            .insert(request_id.to_string(), cart.clone());

        Ok(())
    }

    fn get_expected_uid(&self, node_name: &str) -> Result<Option<TagUid>, StoreError> {
        Ok(self.lock()?.registry.get(node_name).cloned())
    }

    fn get_product_name(&self, product_id: &ProductId) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.product_names.get(product_id).cloned())
    }

    fn get_confirmation(
        &self,
        request_id: &str,
        kind: ConfirmationKind,
    ) -> Result<bool, StoreError> {
        let inner = self.lock()?;

        let confirmed = match kind {
            ConfirmationKind::Item => inner.item_confirmed.contains(request_id),
            ConfirmationKind::Home => inner.home_confirmed.contains(request_id),
        };

        Ok(confirmed)
    }

    fn reset_confirmation(
        &self,
        request_id: &str,
        kind: ConfirmationKind,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;

        match kind {
            ConfirmationKind::Item => inner.item_confirmed.remove(request_id),
            ConfirmationKind::Home => inner.home_confirmed.remove(request_id),
        };

        Ok(())
    }

    fn set_processing(&self, request_id: &str, processing: bool) -> Result<(), StoreError> {
        let mut inner = self.lock()?;

        if processing {
            inner.processing.insert(request_id.to_string());
        } else {
            inner.processing.remove(request_id);
        }

        Ok(())
    }

    fn is_processing(&self, request_id: &str) -> Result<bool, StoreError> {
        Ok(self.lock()?.processing.contains(request_id))
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
