//! # Communications interface crate.
//!
//! Provides the message definitions shared between the look-away watchdog, the sensor publishers
//! and the arm mover service, along with the networking layer used to carry them.

// ------------------------------------------------------------------------------------------------
// MODULES
// ------------------------------------------------------------------------------------------------

/// Message definitions for equipment (the arm and its camera)
pub mod eqpt;

/// Network module
pub mod net;
