//! Turn executor state

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::{debug, error};
use std::thread;
use std::time::{Duration, Instant};
use thiserror::Error;

// Internal
use super::Params;
use crate::hw_client::{send_best_effort, HardwareIo};
use crate::line_follower::{classify, LineState};
use comms_if::eqpt::mech::{DriveCmd, TurnDirection};
use comms_if::store::{report, RequestStore, Status};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// The turn executor.
pub struct TurnExec {
    params: Params,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors that can occur while executing a turn.
#[derive(Debug, Error)]
pub enum TurnError {
    #[error("Turn to the {0} timed out")]
    Timeout(TurnDirection),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl TurnExec {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Execute a single pivot turn.
    ///
    /// The turn command is sent once, then the sensors are polled until the
    /// classifier reports `Centered` on the new line. A centered reading is
    /// only honoured after `min_turn_duration_s` has elapsed, so a sensor
    /// still sitting on the old line cannot complete the turn instantly. On
    /// completion a short forward push clears the turn zone.
    ///
    /// On timeout the trolley is stopped, the failure is reported to the
    /// store, and the caller must assume the heading is uncertain.
    pub fn execute<H, S>(
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
        debug!("Executing {} turn", direction);

        send_best_effort(hw, direction.cmd());

        let start = Instant::now();
        let timeout = Duration::from_secs_f64(self.params.turn_timeout_s);
        let poll = Duration::from_secs_f64(self.params.poll_interval_s);
        let min_duration = Duration::from_secs_f64(self.params.min_turn_duration_s);

        while start.elapsed() < timeout {
            thread::sleep(poll);

            if start.elapsed() < min_duration {
                continue;
            }

            if classify(&hw.read_sensors()) == LineState::Centered {
                debug!(
                    "New line acquired after {:.02} s, clearing turn zone",
                    start.elapsed().as_secs_f64()
                );

                send_best_effort(hw, DriveCmd::Forward);
                thread::sleep(Duration::from_secs_f64(self.params.clear_zone_duration_s));
                send_best_effort(hw, DriveCmd::Stop);
                thread::sleep(Duration::from_secs_f64(self.params.post_turn_pause_s));

                return Ok(());
            }
        }

        error!(
            "Turn to the {} timed out after {} s",
            direction, self.params.turn_timeout_s
        );

        send_best_effort(hw, DriveCmd::Stop);
        report(store, request_id, &Status::TurnTimeout(direction));

        Err(TurnError::Timeout(direction))
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
    use comms_if::eqpt::line::LineReading;

    fn fast_params() -> Params {
        Params {
            turn_timeout_s: 0.2,
            poll_interval_s: 0.001,
            min_turn_duration_s: 0.05,
            clear_zone_duration_s: 0.0,
            post_turn_pause_s: 0.0,
        }
    }

    /// A turn that starts already centered must not complete before the
    /// minimum duration has elapsed.
    #[test]
    fn test_early_centered_reading_is_not_completion() {
        let mut exec = TurnExec::new(fast_params());
        let mut hw = SimHardware::new();
        let store = MemStore::new();

        let start = Instant::now();
        let result = exec.execute(&mut hw, &store, TurnDirection::Right, "r1");

        assert!(result.is_ok());
        assert!(start.elapsed() >= Duration::from_millis(50));

        // Turn command first, stop after the clearing push
        assert_eq!(hw.commands().first(), Some(&DriveCmd::TurnRight));
        assert_eq!(hw.last_command(), Some(DriveCmd::Stop));
    }

    #[test]
    fn test_timeout_stops_and_reports() {
        let mut exec = TurnExec::new(fast_params());
        let mut hw = SimHardware::new();
        let store = MemStore::new();

        // The new line is never found
        hw.set_idle_frame(LineReading::off_line());

        let start = Instant::now();
        let result = exec.execute(&mut hw, &store, TurnDirection::Left, "r1");

        assert!(matches!(result, Err(TurnError::Timeout(TurnDirection::Left))));

        // Returned within the timeout plus scheduling slack, not hanging
        assert!(start.elapsed() < Duration::from_secs(2));

        assert_eq!(hw.last_command(), Some(DriveCmd::Stop));
        assert_eq!(
            store.current_status("r1"),
            Some(String::from("error:turn_timeout:left"))
        );
    }
}
