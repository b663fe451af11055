//! # Equipment Interface
//!
//! This module defines the interface structures which are exchanged with the arm's equipment:
//! joint telemetry and the go-to-position service for the arm itself, raw frames for the camera.

// -----------------------------------------------------------------------------------------------
// MODULES
// -----------------------------------------------------------------------------------------------

pub mod arm;
pub mod cam;
