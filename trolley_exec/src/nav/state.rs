//! Navigator state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error, info, warn};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

// Internal
use super::Params;
use crate::hw_client::{send_best_effort, HardwareIo};
use crate::line_follower::{classify, LineState};
use crate::topo::{initial_turn, Node, Topology};
use crate::turn_exec::{TurnError, TurnExec};
use comms_if::eqpt::mech::{DriveCmd, TurnDirection};
use comms_if::eqpt::rfid::{parse_tag_line, TagUid};
use comms_if::store::{report, RequestStore, Status};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The node navigator.
///
/// `current_node` is owned exclusively here. It reflects the last confirmed
/// physical waypoint and is never optimistically updated mid-transit.
pub struct Navigator {
    params: Params,

    turn_exec: TurnExec,

    current_node: Node,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur during navigation.
#[derive(Debug, Error)]
pub enum NavError {
    #[error("No expected tag UID is registered for node {0}")]
    UnknownDestination(String),

    #[error("Lost the line while navigating to {0}")]
    LineLost(String),

    #[error("Navigation to {0} timed out")]
    Timeout(String),

    #[error("Initial turn failed: {0}")]
    TurnFailed(#[from] TurnError),

    #[error("Cannot reverse between {0} and {1}")]
    ReverseUnsupported(String, String),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Navigator {
    /// Create a navigator believing itself to be at the home node.
    pub fn new(params: Params, turn_params: crate::turn_exec::Params) -> Self {
        Self {
            params,
            turn_exec: TurnExec::new(turn_params),
            current_node: Node::Home,
        }
    }

    /// The last confirmed waypoint.
    pub fn current_node(&self) -> Node {
        self.current_node
    }

    /// Manually override the current position.
    ///
    /// Only for initialisation and recovery, normal operation updates the
    /// position exclusively through confirmed tag matches.
    pub fn set_current_node(&mut self, node: Node) {
        info!("Current node manually set to {:?}", node);
        self.current_node = node;
    }

    /// Execute a pivot turn in place.
    pub fn execute_turn<H, S>(
        &mut self,
        hw: &mut H,
        store: &S,
        direction: TurnDirection,
        request_id: &str,
    ) -> Result<(), TurnError>
    where
        H: HardwareIo,
        S: RequestStore,
    {
        self.turn_exec.execute(hw, store, direction, request_id)
    }

    /// Navigate from the current node to `dest`.
    ///
    /// Issues the initial turn given by the transition policy, then follows
    /// the line until the destination's tag is read. An incorrect tag resumes
    /// forward motion (the peripheral stops itself on any tag read); losing
    /// the line or running out of time stops the trolley and fails the call.
    pub fn navigate_to<H, S>(
        &mut self,
        hw: &mut H,
        store: &S,
        topo: &Topology,
        dest: Node,
        request_id: &str,
    ) -> Result<(), NavError>
    where
        H: HardwareIo,
        S: RequestStore,
    {
        if self.current_node == dest {
            debug!("Already at destination {:?}", dest);
            return Ok(());
        }

        let dest_name = topo.name_of(dest);

        info!(
            "Navigating from {} to {}",
            topo.name_of(self.current_node),
            dest_name
        );
        report(store, request_id, &Status::MovingTo(dest_name.clone()));

        let expected = self.expected_uid(store, topo, dest, request_id)?;

        if let Some(direction) = initial_turn(self.current_node, dest) {
            self.turn_exec.execute(hw, store, direction, request_id)?;
        }

        send_best_effort(hw, DriveCmd::Forward);
        let mut last_cmd = DriveCmd::Forward;

        let start = Instant::now();
        let timeout = Duration::from_secs_f64(self.params.navigation_timeout_s);
        let poll = Duration::from_secs_f64(self.params.poll_interval_s);

        while start.elapsed() < timeout {
            // Arrival detection preempts any steering this iteration
            if let Some(line) = hw.receive_line() {
                if let Some(uid) = parse_tag_line(&line) {
                    if uid == expected {
                        send_best_effort(hw, DriveCmd::Stop);
                        self.current_node = dest;

                        info!("Arrived at {} (tag match)", dest_name);
                        report(store, request_id, &Status::ArrivedAt(dest_name));

                        thread::sleep(Duration::from_secs_f64(self.params.arrival_settle_s));
                        return Ok(());
                    } else {
                        // The peripheral stopped on the tag, get moving again
                        // and let the antenna clear it before the next read
                        warn!(
                            "Incorrect tag on the way to {}: expected {}, got {}",
                            dest_name, expected, uid
                        );

                        send_best_effort(hw, DriveCmd::Forward);
                        last_cmd = DriveCmd::Forward;

                        thread::sleep(Duration::from_secs_f64(self.params.wrong_tag_resume_s));
                        continue;
                    }
                }
            }

            let required = match classify(&hw.read_sensors()) {
                LineState::Centered => DriveCmd::Forward,
                LineState::VeerLeft => DriveCmd::VeerLeft,
                LineState::VeerRight => DriveCmd::VeerRight,
                LineState::Lost => {
                    send_best_effort(hw, DriveCmd::Stop);

                    error!("Lost the line while navigating to {}", dest_name);
                    report(store, request_id, &Status::LineLost);

                    return Err(NavError::LineLost(dest_name));
                }
            };

            // Only send on change, the serial link has a bounded buffer
            if required != last_cmd {
                send_best_effort(hw, required);
                last_cmd = required;
            }

            thread::sleep(poll);
        }

        send_best_effort(hw, DriveCmd::Stop);

        error!(
            "Navigation to {} timed out after {} s",
            dest_name, self.params.navigation_timeout_s
        );
        report(
            store,
            request_id,
            &Status::NavTimeout {
                from: topo.name_of(self.current_node),
                to: dest_name.clone(),
            },
        );

        Err(NavError::Timeout(dest_name))
    }

    /// Reverse from the current node to `dest` without line correction.
    ///
    /// Open-loop: the trolley backs up relying solely on RFID arrival
    /// detection, used where backing out of a dead-end aisle is physically
    /// required. Lower confidence than forward navigation and refused
    /// to/from the home node.
    pub fn reverse_to<H, S>(
        &mut self,
        hw: &mut H,
        store: &S,
        topo: &Topology,
        dest: Node,
        request_id: &str,
    ) -> Result<(), NavError>
    where
        H: HardwareIo,
        S: RequestStore,
    {
        if self.current_node == dest {
            debug!("Already at destination {:?}", dest);
            return Ok(());
        }

        let dest_name = topo.name_of(dest);
        let from_name = topo.name_of(self.current_node);

        if self.current_node == Node::Home || dest == Node::Home {
            error!("Reversing to or from home is not supported");
            return Err(NavError::ReverseUnsupported(from_name, dest_name));
        }

        info!("Reversing from {} to {}", from_name, dest_name);
        report(store, request_id, &Status::ReversingTo(dest_name.clone()));

        let expected = self.expected_uid(store, topo, dest, request_id)?;

        send_best_effort(hw, DriveCmd::Backward);

        let start = Instant::now();
        let timeout = Duration::from_secs_f64(self.params.navigation_timeout_s);
        let poll = Duration::from_secs_f64(self.params.poll_interval_s);

        while start.elapsed() < timeout {
            if let Some(line) = hw.receive_line() {
                if let Some(uid) = parse_tag_line(&line) {
                    if uid == expected {
                        send_best_effort(hw, DriveCmd::Stop);
                        self.current_node = dest;

                        info!("Arrived at {} while reversing (tag match)", dest_name);
                        report(store, request_id, &Status::ArrivedAt(dest_name));

                        thread::sleep(Duration::from_secs_f64(self.params.arrival_settle_s));
                        return Ok(());
                    } else {
                        warn!(
                            "Incorrect tag while reversing to {}: expected {}, got {}",
                            dest_name, expected, uid
                        );

                        send_best_effort(hw, DriveCmd::Backward);
                        thread::sleep(Duration::from_secs_f64(self.params.wrong_tag_resume_s));
                        continue;
                    }
                }
            }

            thread::sleep(poll);
        }

        send_best_effort(hw, DriveCmd::Stop);

        error!(
            "Reversing to {} timed out after {} s",
            dest_name, self.params.navigation_timeout_s
        );
        report(
            store,
            request_id,
            &Status::ReverseTimeout {
                from: from_name,
                to: dest_name.clone(),
            },
        );

        Err(NavError::Timeout(dest_name))
    }

    /// Resolve the tag UID expected at the destination.
    ///
    /// A missing registry entry is a configuration error: the call fails
    /// before any motion is commanded.
    fn expected_uid<S>(
        &self,
        store: &S,
        topo: &Topology,
        dest: Node,
        request_id: &str,
    ) -> Result<TagUid, NavError>
    where
        S: RequestStore,
    {
        let name = topo.name_of(dest);

        match store.get_expected_uid(&name) {
            Ok(Some(uid)) => Ok(uid),
            Ok(None) => {
                error!("No expected UID registered for {}", name);
                report(store, request_id, &Status::NoUid(name.clone()));
                Err(NavError::UnknownDestination(name))
            }
            Err(e) => {
                warn!("Registry lookup for {} failed: {}", name, e);
                report(store, request_id, &Status::NoUid(name.clone()));
                Err(NavError::UnknownDestination(name))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::hw_client::SimHardware;
    use crate::store_client::MemStore;
    use crate::topo::{Params as TopoParams, ProductDef};
    use comms_if::eqpt::line::{LineReading, SensorState};
    use comms_if::store::ProductId;

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

    fn fast_navigator() -> Navigator {
        Navigator::new(
            Params {
                navigation_timeout_s: 0.1,
                poll_interval_s: 0.001,
                arrival_settle_s: 0.0,
                wrong_tag_resume_s: 0.0,
            },
            crate::turn_exec::Params {
                turn_timeout_s: 0.1,
                poll_interval_s: 0.001,
                min_turn_duration_s: 0.0,
                clear_zone_duration_s: 0.0,
                post_turn_pause_s: 0.0,
            },
        )
    }

    fn store_with_uids() -> MemStore {
        let store = MemStore::new();

        store.set_expected_uid("home", TagUid::new("aa00"));
        store.set_expected_uid("RFJ1", TagUid::new("aa01"));
        store.set_expected_uid("RFJ2", TagUid::new("aa02"));

        store
    }

    #[test]
    fn test_arrival_updates_position() {
        let mut nav = fast_navigator();
        let mut hw = SimHardware::new();
        let store = store_with_uids();
        let topo = fixture_topology();

        hw.queue_serial_line("RFID:AA01");

        let result = nav.navigate_to(&mut hw, &store, &topo, Node::FrontJunction(1), "r1");

        assert!(result.is_ok());
        assert_eq!(nav.current_node(), Node::FrontJunction(1));
        assert_eq!(hw.last_command(), Some(DriveCmd::Stop));
        assert_eq!(
            store.current_status("r1"),
            Some(String::from("arrived_at:RFJ1"))
        );
    }

    /// Position must not advance when no tag matches the expected UID.
    #[test]
    fn test_position_only_advances_on_tag_match() {
        let mut nav = fast_navigator();
        let mut hw = SimHardware::new();
        let store = store_with_uids();
        let topo = fixture_topology();

        for _ in 0..5 {
            hw.queue_serial_line("RFID:dead");
        }

        let result = nav.navigate_to(&mut hw, &store, &topo, Node::FrontJunction(1), "r1");

        assert!(matches!(result, Err(NavError::Timeout(_))));
        assert_eq!(nav.current_node(), Node::Home);
    }

    /// Repeating classifier verdicts must not produce repeated commands.
    #[test]
    fn test_command_deduplication() {
        let mut nav = fast_navigator();
        let mut hw = SimHardware::new();
        let store = store_with_uids();
        let topo = fixture_topology();

        // Constantly drifted right: the veer-left correction is required on
        // every iteration of the loop
        hw.set_idle_frame(LineReading::new(
            SensorState::OffLine,
            SensorState::OnLine,
            SensorState::OnLine,
        ));

        let result = nav.navigate_to(&mut hw, &store, &topo, Node::FrontJunction(1), "r1");
        assert!(matches!(result, Err(NavError::Timeout(_))));

        // Forward once, the correction once, stop once - no resends of the
        // unchanged correction across the many loop iterations
        assert_eq!(
            hw.commands(),
            &[DriveCmd::Forward, DriveCmd::VeerLeft, DriveCmd::Stop]
        );
    }

    #[test]
    fn test_lost_line_stops_and_fails() {
        let mut nav = fast_navigator();
        let mut hw = SimHardware::new();
        let store = store_with_uids();
        let topo = fixture_topology();

        hw.set_idle_frame(LineReading::off_line());

        let result = nav.navigate_to(&mut hw, &store, &topo, Node::FrontJunction(1), "r1");

        assert!(matches!(result, Err(NavError::LineLost(_))));
        assert_eq!(nav.current_node(), Node::Home);
        assert_eq!(hw.last_command(), Some(DriveCmd::Stop));
        assert_eq!(
            store.current_status("r1"),
            Some(String::from("error:line_lost"))
        );
    }

    #[test]
    fn test_unknown_destination_fails_without_moving() {
        let mut nav = fast_navigator();
        let mut hw = SimHardware::new();
        let store = store_with_uids();
        let topo = fixture_topology();

        // RFJ3 has no registry entry
        let result = nav.navigate_to(&mut hw, &store, &topo, Node::FrontJunction(3), "r1");

        assert!(matches!(result, Err(NavError::UnknownDestination(_))));
        assert!(hw.commands().is_empty());
        assert_eq!(
            store.current_status("r1"),
            Some(String::from("error:no_uid:RFJ3"))
        );
    }

    /// A navigation with no qualifying input returns within the timeout.
    #[test]
    fn test_timeout_is_bounded() {
        let mut nav = fast_navigator();
        let mut hw = SimHardware::new();
        let store = store_with_uids();
        let topo = fixture_topology();

        let start = Instant::now();
        let result = nav.navigate_to(&mut hw, &store, &topo, Node::FrontJunction(1), "r1");

        assert!(matches!(result, Err(NavError::Timeout(_))));
        assert!(start.elapsed() < Duration::from_secs(2));
        assert_eq!(
            store.current_status("r1"),
            Some(String::from("error:nav_timeout:home->RFJ1"))
        );
    }

    #[test]
    fn test_navigate_to_current_node_is_noop() {
        let mut nav = fast_navigator();
        let mut hw = SimHardware::new();
        let store = store_with_uids();
        let topo = fixture_topology();

        let result = nav.navigate_to(&mut hw, &store, &topo, Node::Home, "r1");

        assert!(result.is_ok());
        assert!(hw.commands().is_empty());
    }

    #[test]
    fn test_reverse_refused_to_or_from_home() {
        let mut nav = fast_navigator();
        let mut hw = SimHardware::new();
        let store = store_with_uids();
        let topo = fixture_topology();

        let result = nav.reverse_to(&mut hw, &store, &topo, Node::FrontJunction(1), "r1");

        assert!(matches!(result, Err(NavError::ReverseUnsupported(_, _))));
        assert!(hw.commands().is_empty());
    }

    #[test]
    fn test_reverse_arrival() {
        let mut nav = fast_navigator();
        let mut hw = SimHardware::new();
        let store = store_with_uids();
        let topo = fixture_topology();

        nav.set_current_node(Node::BackJunction(2));
        hw.queue_serial_line("RFID:aa02");

        let result = nav.reverse_to(&mut hw, &store, &topo, Node::FrontJunction(2), "r1");

        assert!(result.is_ok());
        assert_eq!(nav.current_node(), Node::FrontJunction(2));
        assert_eq!(hw.commands().first(), Some(&DriveCmd::Backward));
        assert_eq!(hw.last_command(), Some(DriveCmd::Stop));
    }
}
