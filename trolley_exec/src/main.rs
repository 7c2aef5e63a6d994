//! Main trolley-side executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise the session, logger and parameters
//!     - Seed the store registries and initialise the hardware interface
//!     - Main loop:
//!         - Request acquisition (store queue or request script)
//!         - Trip processing:
//!             - Cart merge and row partitioning
//!             - Row traversal with item confirmation gates
//!             - Home return
//!         - Trip report archiving
//!
//! Trip processing runs behind a panic boundary: whatever happens, the
//! motors are stopped and the request's processing flag is cleared before
//! the loop moves on.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

#[cfg(all(target_arch = "arm", target_os = "linux"))]
use trolley_lib::hw_client::RpiHardware;
#[cfg(not(all(target_arch = "arm", target_os = "linux")))]
use trolley_lib::hw_client::SimHardware;
use trolley_lib::{
    hw_client::send_best_effort,
    params::{RegistryParams, TrolleyExecParams},
    store_client::MemStore,
    topo::Topology,
    trip::{TripCtrl, TripReport},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{error, info, warn};
use std::collections::VecDeque;
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::thread;
use std::time::{Duration, Instant};

// Internal
use comms_if::eqpt::mech::DriveCmd;
use comms_if::eqpt::rfid::TagUid;
use comms_if::store::{report, ProductId, RequestStore, Status, TrolleyRequest};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    script_interpreter::{PendingRequests, ScriptInterpreter},
    session::{self, Session},
};

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session = Session::new("trolley_exec", "sessions")
        .wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Shopping Trolley Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    // ---- LOAD PARAMETERS ----

    let exec_params: TrolleyExecParams =
        util::params::load("trolley_exec.toml").wrap_err("Could not load exec params")?;

    let topo = Topology::from_params(
        util::params::load("topo.toml").wrap_err("Could not load topology params")?,
    )
    .wrap_err("Store topology is invalid")?;

    info!(
        "Exec parameters loaded, store topology has {} rows",
        topo.num_rows()
    );

    // ---- INITIALISE REQUEST SOURCE ----

    // Request source determines whether requests come from a script or from
    // the store's queue.
    let mut request_source;

    // Collect all arguments
    let args: Vec<String> = env::args().collect();

    // If we have a single argument use it as the script path
    if args.len() == 2 {
        info!("Loading request script from \"{}\"", &args[1]);

        let si = ScriptInterpreter::new(&args[1]).wrap_err("Failed to load script")?;

        info!(
            "Loaded script lasts {:.02} s and contains {} requests\n",
            si.get_duration(),
            si.get_num_requests()
        );

        request_source = RequestSource::Script(si);
    }
    // If no arguments requests are drained from the store's queue
    else if args.len() == 1 {
        info!("No script provided, requests will be drained from the store\n");
        request_source = RequestSource::Store;
    } else {
        return Err(eyre!(
            "Expected either zero or one argument, found {}",
            args.len() - 1
        ));
    }

    // ---- INITIALISE STORE ----

    let store = MemStore::new();

    let registry: RegistryParams =
        util::params::load("registry.toml").wrap_err("Could not load registry params")?;

    for (node, uid) in registry.nodes.iter() {
        store.set_expected_uid(node, TagUid::new(uid));
    }
    for (id, name) in registry.products.iter() {
        store.set_product_name(ProductId::new(id), name);
    }

    info!(
        "Store registries seeded ({} nodes, {} products)",
        registry.nodes.len(),
        registry.products.len()
    );

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut trip_ctrl = TripCtrl::new(
        util::params::load("trip.toml").wrap_err("Could not load trip params")?,
        util::params::load("nav.toml").wrap_err("Could not load nav params")?,
        util::params::load("turn_exec.toml").wrap_err("Could not load turn params")?,
        topo,
    );

    info!("TripCtrl init complete");

    // ---- INITIALISE HARDWARE ----

    #[cfg(all(target_arch = "arm", target_os = "linux"))]
    let mut hw = {
        let hw_params = util::params::load("hw.toml").wrap_err("Could not load hw params")?;
        let h = RpiHardware::new(&hw_params).wrap_err("Failed to initialise the hardware")?;
        info!("Hardware interface initialised");
        h
    };

    #[cfg(not(all(target_arch = "arm", target_os = "linux")))]
    let mut hw = {
        info!("Not running on trolley hardware, using the simulated interface");
        SimHardware::new()
    };

    // ---- MAIN LOOP ----

    info!("Begining main loop\n");

    let mut pending: VecDeque<TrolleyRequest> = VecDeque::new();
    let request_poll = Duration::from_secs_f64(exec_params.request_poll_interval_s);

    loop {
        // ---- REQUEST ACQUISITION ----

        match request_source {
            RequestSource::Script(ref mut si) => match si.get_pending_requests() {
                PendingRequests::None => (),
                PendingRequests::Some(reqs) => pending.extend(reqs),
                PendingRequests::EndOfScript => {
                    if pending.is_empty() {
                        info!("End of request script reached, stopping");
                        break;
                    }
                }
            },
            RequestSource::Store => match store.next_request() {
                Ok(Some(req)) => pending.push_back(req),
                Ok(None) => (),
                Err(e) => warn!("Could not poll the request queue: {}", e),
            },
        }

        let request = match pending.pop_front() {
            Some(r) => r,
            None => {
                thread::sleep(request_poll);
                continue;
            }
        };

        // ---- TRIP PROCESSING ----

        let request_id = request.request_id.clone();

        match store.is_processing(&request_id) {
            Ok(true) => {
                warn!("Request {} is already being processed, ignoring", request_id);
                continue;
            }
            Ok(false) => (),
            Err(e) => warn!("Could not check processing flag for {}: {}", request_id, e),
        }

        if let Err(e) = store.set_processing(&request_id, true) {
            warn!("Could not set processing flag for {}: {}", request_id, e);
        }

        info!("Processing request {}...", request_id);
        let trip_start = Instant::now();

        // Panic boundary: a bug in trip processing must not take the process
        // (and the moving trolley) down with it
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            trip_ctrl.process_request(&mut hw, &store, &request)
        }));

        let outcome = match result {
            Ok(Ok(())) => {
                info!("Finished processing {}", request_id);
                String::from("completed")
            }
            Ok(Err(e)) => {
                // The failing sub-operation has already reported its status
                error!("Request {} failed: {}", request_id, e);
                format!("failed: {}", e)
            }
            Err(_) => {
                error!("Panic while processing request {}", request_id);
                report(&store, &request_id, &Status::CriticalProcessingError);
                send_best_effort(&mut hw, DriveCmd::Stop);
                String::from("critical_processing_exception")
            }
        };

        // Clear the processing flag on every exit path
        if let Err(e) = store.set_processing(&request_id, false) {
            warn!("Could not clear processing flag for {}: {}", request_id, e);
        }

        // ---- TRIP REPORT ----

        session::save_with_timestamp(
            "reports/trip_report.json",
            TripReport {
                request_id,
                outcome,
                final_node: trip_ctrl.current_node_name(),
                duration_s: trip_start.elapsed().as_secs_f64(),
            },
        );
    }

    // ---- SHUTDOWN ----

    // Never leave the trolley moving
    send_best_effort(&mut hw, DriveCmd::Stop);

    info!("End of execution");

    session.exit();

    Ok(())
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Various sources for the requests incoming to the exec.
enum RequestSource {
    Store,
    Script(ScriptInterpreter),
}
