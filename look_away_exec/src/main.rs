//! # Look-Away Executable
//!
//! Watches the arm's joint telemetry and camera frames, and moves the arm back to its centre
//! position whenever the arm is idle and the camera sees a uniform scene.
//!
//! # Architecture
//!
//!     - Initialise session, logging and parameters
//!     - Connect to the sensor publishers and the arm mover service
//!     - Main loop:
//!         - Poll both sensor streams
//!         - Hand each event to the watcher, one at a time
//!         - Periodically report the watcher's counters

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{eyre::WrapErr, Result};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Instant;
use structopt::StructOpt;

// Internal
use look_away_lib::{
    arm_mover_client::ArmMoverClient, params::LookAwayExecParams, sens_client::SensClient,
    watcher::Watcher,
};
use util::{
    host,
    logger::{logger_init, LevelFilter},
    session::Session,
};

// ---------------------------------------------------------------------------
// STRUCTS
// ---------------------------------------------------------------------------

/// Command line options
#[derive(Debug, StructOpt)]
#[structopt(name = "look_away_exec")]
struct Opt {
    /// Parameter file, relative to `$LOOK_AWAY_ROOT/params`
    #[structopt(long, default_value = "look_away_exec.toml")]
    params: String,

    /// Explicit path to the parameter file, overrides `--params`
    #[structopt(long, parse(from_os_str))]
    params_path: Option<PathBuf>,

    /// Minimum level of log messages, `info` or more verbose
    #[structopt(long, default_value = "debug")]
    log_level: LevelFilter,
}

// ---------------------------------------------------------------------------
// MAIN
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    color_eyre::install()?;

    let opt = Opt::from_args();

    // ---- EARLY INITIALISATION ----

    let session =
        Session::new("look_away_exec", "sessions").wrap_err("Failed to create the session")?;

    logger_init(opt.log_level, &session).wrap_err("Failed to initialise logging")?;

    info!("Look-Away Executable\n");
    info!(
        "Running on: {:#?}",
        host::get_uname().wrap_err("Failed to get host information")?
    );
    info!("Session directory: {:?}\n", session.session_root);

    info!("Initialising...");

    // ---- LOAD PARAMETERS ----

    let params: LookAwayExecParams = match opt.params_path {
        Some(ref p) => util::params::load_from_path(p),
        None => util::params::load(&opt.params),
    }
    .wrap_err("Failed to load parameters")?;

    let stats_period = params.stats_period().wrap_err("Invalid parameters")?;

    info!("Parameters loaded: {:#?}", params);

    // ---- NETWORK INITIALISATION ----

    let zmq_ctx = comms_if::net::zmq::Context::new();

    let mut sens_client =
        SensClient::new(&zmq_ctx, &params).wrap_err("Failed to initialise SensClient")?;
    info!("SensClient initialised");

    let arm_mover_client =
        ArmMoverClient::new(&zmq_ctx, &params).wrap_err("Failed to initialise ArmMoverClient")?;
    info!("ArmMoverClient initialised");

    let mut watcher = Watcher::new(&params, arm_mover_client);

    // ---- MAIN LOOP ----

    info!("Initialisation complete, entering main loop");

    let mut last_stats = Instant::now();

    loop {
        match sens_client.poll(params.poll_timeout_ms) {
            Ok(events) => {
                for event in events.iter() {
                    watcher.handle(event);
                }
            }
            Err(e) => warn!("Could not get sensor data: {}", e),
        }

        if last_stats.elapsed() >= stats_period {
            info!("Status: {:?}", watcher.stats());
            last_stats = Instant::now();
        }
    }
}
