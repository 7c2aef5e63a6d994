//! Itinerary sequencer state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{info, warn};
use std::thread;
use std::time::Duration;
use thiserror::Error;

// Internal
use super::{cart, Params};
use crate::hw_client::{send_best_effort, HardwareIo};
use crate::nav::{NavError, Navigator};
use crate::topo::{Node, Topology};
use crate::turn_exec::TurnError;
use comms_if::eqpt::mech::DriveCmd;
use comms_if::store::{
    report, Cart, ConfirmationKind, ProductId, RequestAction, RequestStore, Status, TrolleyRequest,
};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The itinerary sequencer.
///
/// Assumes single-threaded, single-trip execution: the caller is responsible
/// for not re-entering a request that is already being processed (the
/// processing flag in the store provides that guard).
pub struct TripCtrl {
    params: Params,

    topo: Topology,

    nav: Navigator,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can abort a shopping trip.
///
/// Every variant has already been reported to the store by the operation
/// that failed, so the boundary only needs to log it.
#[derive(Debug, Error)]
pub enum TripError {
    #[error("Navigation failed: {0}")]
    Nav(#[from] NavError),

    #[error("Turn failed: {0}")]
    Turn(#[from] TurnError),

    #[error("Item confirmation failed for {0}")]
    ItemConfirmationFailed(ProductId),

    #[error("Home confirmation failed")]
    HomeConfirmationFailed,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TripCtrl {
    pub fn new(
        params: Params,
        nav_params: crate::nav::Params,
        turn_params: crate::turn_exec::Params,
        topo: Topology,
    ) -> Self {
        Self {
            params,
            topo,
            nav: Navigator::new(nav_params, turn_params),
        }
    }

    /// The navigator's current node.
    pub fn current_node(&self) -> Node {
        self.nav.current_node()
    }

    /// Name of the navigator's current node.
    pub fn current_node_name(&self) -> String {
        self.topo.name_of(self.nav.current_node())
    }

    /// Process a single request to completion.
    pub fn process_request<H, S>(
        &mut self,
        hw: &mut H,
        store: &S,
        request: &TrolleyRequest,
    ) -> Result<(), TripError>
    where
        H: HardwareIo,
        S: RequestStore,
    {
        match &request.action {
            RequestAction::Home => {
                self.move_home(hw, store, &request.request_id)?;
                report(store, &request.request_id, &Status::Completed);
                Ok(())
            }
            RequestAction::Cart(delta) => {
                self.process_shopping_list(hw, store, &request.request_id, delta)
            }
        }
    }

    /// Run a shopping trip for a cart delta.
    fn process_shopping_list<H, S>(
        &mut self,
        hw: &mut H,
        store: &S,
        request_id: &str,
        delta: &Cart,
    ) -> Result<(), TripError>
    where
        H: HardwareIo,
        S: RequestStore,
    {
        info!("Processing shopping list for request {}", request_id);
        report(store, request_id, &Status::ProcessingList);

        // Merge into the persisted cart. Store faults here are transient:
        // fall back to an empty cart and carry on with what was requested.
        let existing = store.get_cart(request_id).unwrap_or_else(|e| {
            warn!("Could not fetch persisted cart for {}: {}", request_id, e);
            Cart::new()
        });

        let merged = cart::merge(existing, delta);

        if let Err(e) = store.set_cart(request_id, &merged) {
            warn!("Could not persist cart for {}: {}", request_id, e);
        }

        let partition = cart::partition_by_row(&merged, &self.topo);

        if partition.by_row.is_empty() {
            info!("No valid products in cart to process");
            report(store, request_id, &Status::CompletedEmptyCart);
            return self.move_home(hw, store, request_id);
        }

        let highest_row = partition
            .by_row
            .keys()
            .next_back()
            .copied()
            .unwrap_or_default();

        for (row, products) in partition.by_row.iter() {
            self.process_row(hw, store, request_id, *row, products, *row == highest_row)?;
        }

        // All rows done, hard gate on the user releasing the trolley
        info!("All rows complete, waiting for home confirmation");
        report(store, request_id, &Status::WaitingForHomeConfirmation);

        let confirmed = store
            .wait_for_confirmation(
                request_id,
                ConfirmationKind::Home,
                Duration::from_secs_f64(self.params.confirmation_timeout_s),
                Duration::from_secs_f64(self.params.confirmation_poll_interval_s),
            )
            .unwrap_or_else(|e| {
                warn!("Home confirmation wait failed for {}: {}", request_id, e);
                false
            });

        if !confirmed {
            report(store, request_id, &Status::HomeConfirmationFailed);
            send_best_effort(hw, DriveCmd::Stop);
            return Err(TripError::HomeConfirmationFailed);
        }

        report(store, request_id, &Status::ReturningHome);
        self.move_home(hw, store, request_id)?;

        report(store, request_id, &Status::Completed);
        Ok(())
    }

    /// Traverse one row, collecting its products.
    fn process_row<H, S>(
        &mut self,
        hw: &mut H,
        store: &S,
        request_id: &str,
        row: u8,
        products: &[ProductId],
        is_last_row: bool,
    ) -> Result<(), TripError>
    where
        H: HardwareIo,
        S: RequestStore,
    {
        info!("Processing row {} ({} products)", row, products.len());
        report(store, request_id, &Status::ProcessingRow(row));

        self.nav
            .navigate_to(hw, store, &self.topo, Node::FrontJunction(row), request_id)?;

        // Nudge past the junction marking so the pivot lands on the aisle
        // mouth rather than the junction box
        send_best_effort(hw, DriveCmd::Forward);
        thread::sleep(Duration::from_secs_f64(self.params.junction_nudge_duration_s));
        send_best_effort(hw, DriveCmd::Stop);
        thread::sleep(Duration::from_secs_f64(self.params.junction_nudge_pause_s));

        self.nav
            .execute_turn(hw, store, self.params.aisle_entry_turn, request_id)?;

        for id in products.iter() {
            let node = match self.topo.node_for_product(id) {
                Some(n) => n,
                None => {
                    warn!("Product {} lost its slot assignment, skipping", id);
                    continue;
                }
            };

            let name = match store.get_product_name(id) {
                Ok(Some(n)) => n,
                Ok(None) => String::from("Unknown Product"),
                Err(e) => {
                    warn!("Could not fetch name for {}: {}", id, e);
                    String::from("Unknown Product")
                }
            };

            report(
                store,
                request_id,
                &Status::MovingToProduct(self.topo.name_of(node)),
            );
            self.nav.navigate_to(hw, store, &self.topo, node, request_id)?;

            info!("At {} ({}), waiting for the user", id, name);
            report(
                store,
                request_id,
                &Status::WaitingForItem(id.clone(), name),
            );

            let confirmed = store
                .wait_for_confirmation(
                    request_id,
                    ConfirmationKind::Item,
                    Duration::from_secs_f64(self.params.confirmation_timeout_s),
                    Duration::from_secs_f64(self.params.confirmation_poll_interval_s),
                )
                .unwrap_or_else(|e| {
                    warn!("Item confirmation wait failed for {}: {}", request_id, e);
                    false
                });

            if !confirmed {
                report(store, request_id, &Status::ItemConfirmationFailed(id.clone()));
                send_best_effort(hw, DriveCmd::Stop);
                return Err(TripError::ItemConfirmationFailed(id.clone()));
            }

            report(store, request_id, &Status::ItemAdded(id.clone()));
        }

        self.nav
            .navigate_to(hw, store, &self.topo, Node::BackJunction(row), request_id)?;

        if !is_last_row {
            info!("More rows to process, turning at {}", self.topo.name_of(Node::BackJunction(row)));
            self.nav
                .execute_turn(hw, store, self.params.next_row_turn, request_id)?;
        }

        Ok(())
    }

    /// Bring the trolley back to the home dock from wherever it is.
    ///
    /// From inside an aisle the trolley first regains the row's front
    /// junction: forward navigation from a product slot, open-loop reverse
    /// from a back junction (the aisle ends are dead ends). At the front
    /// junction it turns onto the home path and navigates home.
    pub fn move_home<H, S>(
        &mut self,
        hw: &mut H,
        store: &S,
        request_id: &str,
    ) -> Result<(), TripError>
    where
        H: HardwareIo,
        S: RequestStore,
    {
        info!("Returning to the home position");
        report(store, request_id, &Status::MovingTo(String::from("home")));

        if self.nav.current_node() == Node::Home {
            info!("Already at home");
            report(store, request_id, &Status::ArrivedAt(String::from("home")));
            return Ok(());
        }

        match self.nav.current_node() {
            Node::Product { row, .. } => {
                self.nav
                    .navigate_to(hw, store, &self.topo, Node::FrontJunction(row), request_id)?;
            }
            Node::BackJunction(row) => {
                self.nav
                    .reverse_to(hw, store, &self.topo, Node::FrontJunction(row), request_id)?;
            }
            _ => (),
        }

        if let Node::FrontJunction(_) = self.nav.current_node() {
            self.nav
                .execute_turn(hw, store, self.params.home_turn, request_id)?;
        }

        self.nav
            .navigate_to(hw, store, &self.topo, Node::Home, request_id)?;

        info!("Arrived at the home position");
        Ok(())
    }
}
