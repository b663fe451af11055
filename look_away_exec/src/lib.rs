//! # Look-away library.
//!
//! Decision logic and network clients of the look-away watchdog, which moves the arm back to its
//! centre position whenever the arm is idle and its camera sees a uniform scene.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Arm mover client - sends go to position requests to the arm mover service
pub mod arm_mover_client;

/// Centering dispatcher - decides when to centre the arm
pub mod centering;

/// Frame classifier - detects uniform camera frames
pub mod frame_class;

/// Motion classifier - detects arm motion from joint telemetry
pub mod motion_class;

/// Parameters for the executable
pub mod params;

/// Sensor client - subscribes to joint telemetry and camera frames
pub mod sens_client;

/// Watcher - feeds sensor events to the classifiers and dispatcher one at a time
pub mod watcher;
