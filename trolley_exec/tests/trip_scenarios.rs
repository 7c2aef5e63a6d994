//! End-to-end shopping trip scenarios driven through the simulated hardware
//! and the in-memory store.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::thread;
use std::time::Duration;

use comms_if::eqpt::mech::{DriveCmd, TurnDirection};
use comms_if::eqpt::rfid::TagUid;
use comms_if::store::{Cart, ProductId, RequestStore, TrolleyRequest};
use trolley_lib::hw_client::SimHardware;
use trolley_lib::store_client::MemStore;
use trolley_lib::topo::{Node, Params as TopoParams, ProductDef, Topology};
use trolley_lib::trip::{Params as TripParams, TripCtrl, TripError};

// ------------------------------------------------------------------------------------------------
// FIXTURES
// ------------------------------------------------------------------------------------------------

/// The deployed store: 3 rows of 3 slots, products pdt1..pdt9.
fn fixture_topology() -> Topology {
    let products = (1..=9u8)
        .map(|n| ProductDef {
            id: ProductId::new(format!("pdt{}", n)),
            row: (n - 1) / 3 + 1,
            slot: (n - 1) % 3 + 1,
        })
        .collect();

    Topology::from_params(TopoParams {
        rows: 3,
        slots_per_row: 3,
        products,
    })
    .unwrap()
}

fn fixture_trip_ctrl() -> TripCtrl {
    TripCtrl::new(
        TripParams {
            confirmation_timeout_s: 0.5,
            confirmation_poll_interval_s: 0.001,
            junction_nudge_duration_s: 0.0,
            junction_nudge_pause_s: 0.0,
            aisle_entry_turn: TurnDirection::Right,
            next_row_turn: TurnDirection::Left,
            home_turn: TurnDirection::Right,
        },
        trolley_lib::nav::Params {
            navigation_timeout_s: 0.2,
            poll_interval_s: 0.001,
            arrival_settle_s: 0.0,
            wrong_tag_resume_s: 0.0,
        },
        trolley_lib::turn_exec::Params {
            turn_timeout_s: 0.2,
            poll_interval_s: 0.001,
            min_turn_duration_s: 0.0,
            clear_zone_duration_s: 0.0,
            post_turn_pause_s: 0.0,
        },
        fixture_topology(),
    )
}

/// UID of the tag at a node, as used by both the registry and the simulated
/// tag reads.
fn uid_of(node_name: &str) -> String {
    format!("aa{}", node_name.to_lowercase())
}

fn fixture_store() -> MemStore {
    let store = MemStore::new();
    let topo = fixture_topology();

    let mut names = vec![String::from("home")];
    for row in 1..=3u8 {
        names.push(format!("RFJ{}", row));
        names.push(format!("RBJ{}", row));
    }
    for (row, slot) in (1..=3u8).flat_map(|r| (1..=3u8).map(move |s| (r, s))) {
        names.push(topo.name_of(Node::Product { row, slot }));
    }

    for name in names {
        store.set_expected_uid(&name, TagUid::new(uid_of(&name)));
    }

    store.set_product_name(ProductId::new("pdt4"), "Oat Milk");

    store
}

fn cart_request(request_id: &str, entries: &[(&str, i64)]) -> TrolleyRequest {
    let cart: Cart = entries
        .iter()
        .map(|(id, qty)| (ProductId::new(id), *qty))
        .collect();

    TrolleyRequest {
        request_id: request_id.to_string(),
        action: comms_if::store::RequestAction::Cart(cart),
    }
}

/// Queue the tag reads for a sequence of node arrivals.
fn queue_arrivals(hw: &mut SimHardware, node_names: &[&str]) {
    for name in node_names {
        hw.queue_serial_line(format!("RFID:{}", uid_of(name)));
    }
}

/// Assert that `expected` appears within `history` in order (other statuses
/// may be interleaved).
fn assert_subsequence(history: &[String], expected: &[&str]) {
    let mut iter = history.iter();

    for want in expected {
        assert!(
            iter.any(|got| got == want),
            "status '{}' missing or out of order in {:?}",
            want,
            history
        );
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

/// A single-row trip: out to row 2, collect the item, return home.
#[test]
fn single_row_trip_completes() {
    let mut trip_ctrl = fixture_trip_ctrl();
    let mut hw = SimHardware::new();
    let store = fixture_store();

    // Arrival order: front junction, product, back junction, then the
    // reverse back to the front junction and the run home
    queue_arrivals(&mut hw, &["RFJ2", "pdt4", "RBJ2", "RFJ2", "home"]);

    store.confirm_item("r1");
    store.confirm_home("r1");

    let result = trip_ctrl.process_request(&mut hw, &store, &cart_request("r1", &[("pdt4", 2)]));

    assert!(result.is_ok(), "trip failed: {:?}", result);
    assert_eq!(trip_ctrl.current_node(), Node::Home);

    let history = store.status_history("r1");
    assert_subsequence(
        &history,
        &[
            "processing_list",
            "processing_row:2",
            "moving_to:RFJ2",
            "arrived_at:RFJ2",
            "moving_to_product:pdt4",
            "arrived_at:pdt4",
            "waiting_for_item:pdt4:Oat Milk",
            "item_added:pdt4",
            "arrived_at:RBJ2",
            "waiting_for_home_confirmation",
            "returning_home",
            "reversing_to:RFJ2",
            "arrived_at:home",
            "completed",
        ],
    );
    assert_eq!(history.last().map(String::as_str), Some("completed"));

    // The merged cart was persisted
    let cart = store.get_cart("r1").unwrap();
    assert_eq!(cart.get(&ProductId::new("pdt4")), Some(&2));

    // The trip ends with the trolley stopped
    assert_eq!(hw.last_command(), Some(DriveCmd::Stop));
}

/// Submitting the same product twice accumulates in the persisted cart.
#[test]
fn cart_merge_accumulates_across_requests() {
    let store = fixture_store();

    let existing: Cart = vec![(ProductId::new("pdt4"), 2)].into_iter().collect();
    store.set_cart("r1", &existing).unwrap();

    let mut trip_ctrl = fixture_trip_ctrl();
    let mut hw = SimHardware::new();

    queue_arrivals(&mut hw, &["RFJ2", "pdt4", "RBJ2", "RFJ2", "home"]);
    store.confirm_item("r1");
    store.confirm_home("r1");

    trip_ctrl
        .process_request(&mut hw, &store, &cart_request("r1", &[("pdt4", 3)]))
        .unwrap();

    let cart = store.get_cart("r1").unwrap();
    assert_eq!(cart.get(&ProductId::new("pdt4")), Some(&5));
}

/// A cart of only unassigned products is reported as empty and the trolley
/// goes straight to the home-return phase.
#[test]
fn unassigned_products_are_skipped() {
    let mut trip_ctrl = fixture_trip_ctrl();
    let mut hw = SimHardware::new();
    let store = fixture_store();

    let result = trip_ctrl.process_request(&mut hw, &store, &cart_request("r1", &[("pdt99", 1)]));

    assert!(result.is_ok(), "trip failed: {:?}", result);

    let history = store.status_history("r1");
    assert_subsequence(
        &history,
        &["processing_list", "completed_empty_cart", "arrived_at:home"],
    );
    assert!(!history.iter().any(|s| s.starts_with("processing_row")));
}

/// A trip over two rows turns at the intermediate back junction and visits
/// the rows in ascending order.
#[test]
fn multi_row_trip_turns_between_rows() {
    let mut trip_ctrl = fixture_trip_ctrl();
    let mut hw = SimHardware::new();
    let store = fixture_store();

    queue_arrivals(
        &mut hw,
        &["RFJ1", "pdt1", "RBJ1", "RFJ3", "pdt7", "RBJ3", "RFJ3", "home"],
    );

    // Confirmations are consumed per item, keep re-raising them while the
    // trip runs
    let confirmer = store.clone();
    thread::spawn(move || {
        for _ in 0..5000 {
            confirmer.confirm_item("r1");
            confirmer.confirm_home("r1");
            thread::sleep(Duration::from_millis(1));
        }
    });

    let result = trip_ctrl.process_request(
        &mut hw,
        &store,
        &cart_request("r1", &[("pdt7", 1), ("pdt1", 1)]),
    );

    assert!(result.is_ok(), "trip failed: {:?}", result);
    assert_eq!(trip_ctrl.current_node(), Node::Home);

    let history = store.status_history("r1");
    assert_subsequence(
        &history,
        &[
            "processing_row:1",
            "item_added:pdt1",
            "arrived_at:RBJ1",
            "processing_row:3",
            "item_added:pdt7",
            "arrived_at:RBJ3",
            "arrived_at:home",
        ],
    );

    // The between-rows turn is a pivot to the left
    assert!(hw.commands().contains(&DriveCmd::TurnLeft));
}

/// An item confirmation timeout aborts the whole trip with the trolley
/// stopped at the product.
#[test]
fn item_confirmation_timeout_aborts_trip() {
    let mut trip_ctrl = fixture_trip_ctrl();
    let mut hw = SimHardware::new();
    let store = fixture_store();

    queue_arrivals(&mut hw, &["RFJ2", "pdt4"]);
    // No confirmations raised

    let result = trip_ctrl.process_request(&mut hw, &store, &cart_request("r1", &[("pdt4", 1)]));

    assert!(matches!(result, Err(TripError::ItemConfirmationFailed(_))));
    assert_eq!(
        store.current_status("r1").as_deref(),
        Some("error:item_confirmation_failed:pdt4")
    );
    assert_eq!(hw.last_command(), Some(DriveCmd::Stop));

    // The trolley still believes it is at the product, not somewhere new
    assert_eq!(trip_ctrl.current_node(), Node::Product { row: 2, slot: 1 });
}

/// The home confirmation is a hard gate: without it the trolley stays put.
#[test]
fn home_confirmation_timeout_aborts_trip() {
    let mut trip_ctrl = fixture_trip_ctrl();
    let mut hw = SimHardware::new();
    let store = fixture_store();

    queue_arrivals(&mut hw, &["RFJ2", "pdt4", "RBJ2"]);
    store.confirm_item("r1");
    // Home confirmation never raised

    let result = trip_ctrl.process_request(&mut hw, &store, &cart_request("r1", &[("pdt4", 1)]));

    assert!(matches!(result, Err(TripError::HomeConfirmationFailed)));
    assert_eq!(
        store.current_status("r1").as_deref(),
        Some("error:home_confirmation_failed")
    );
    assert_eq!(trip_ctrl.current_node(), Node::BackJunction(2));
}

/// A recall request from the home position reports completion immediately.
#[test]
fn home_request_at_home_is_trivially_complete() {
    let mut trip_ctrl = fixture_trip_ctrl();
    let mut hw = SimHardware::new();
    let store = fixture_store();

    let request = TrolleyRequest {
        request_id: String::from("r9"),
        action: comms_if::store::RequestAction::Home,
    };

    let result = trip_ctrl.process_request(&mut hw, &store, &request);

    assert!(result.is_ok());
    assert_subsequence(
        &store.status_history("r9"),
        &["moving_to:home", "arrived_at:home", "completed"],
    );
}
