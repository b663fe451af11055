//! # Look-Away Executable Parameters
//!
//! This module provides parameters for the look-away executable.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{centering::CenteringParams, motion_class::MotionClassParams};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default number of messages queued on each sensor subscription.
pub const DEFAULT_SUB_QUEUE_LEN: i32 = 10;

/// Longest allowed period between status reports.
///
/// Units: seconds
pub const MAX_STATS_PERIOD_S: f64 = 86_400.0;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookAwayExecParams {
    /// Network endpoint of the joint state publisher
    pub joint_states_endpoint: String,

    /// Network endpoint of the raw camera frame publisher
    pub frames_endpoint: String,

    /// Network endpoint of the arm mover service
    pub arm_mover_endpoint: String,

    /// Maximum time to wait for the arm mover to accept or answer a request.
    ///
    /// Units: milliseconds
    pub arm_mover_timeout_ms: i32,

    /// Maximum time to wait for sensor data on each loop.
    ///
    /// Units: milliseconds
    pub poll_timeout_ms: i64,

    /// Maximum number of messages queued on each sensor subscription. Newer messages are dropped
    /// while the queue is full.
    #[serde(default = "default_sub_queue_len")]
    pub sub_queue_len: i32,

    /// Period between status reports.
    ///
    /// Units: seconds
    pub stats_period_s: f64,

    #[serde(default)]
    pub motion_class: MotionClassParams,

    #[serde(default)]
    pub centering: CenteringParams,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Parameter values which can't be used.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParamsError {
    #[error("stats_period_s must be between 0 and {max} seconds, found {0}", max = MAX_STATS_PERIOD_S)]
    InvalidStatsPeriod(f64),

    #[error("sub_queue_len must be at least 1, found {0}")]
    InvalidSubQueueLen(i32),

    #[error("arm_mover_timeout_ms must be at least 1, found {0}")]
    InvalidArmMoverTimeout(i32),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl LookAwayExecParams {
    /// Check the loaded values are usable.
    pub fn validate(&self) -> Result<(), ParamsError> {
        if !(self.stats_period_s >= 0.0 && self.stats_period_s <= MAX_STATS_PERIOD_S) {
            return Err(ParamsError::InvalidStatsPeriod(self.stats_period_s));
        }

        if self.sub_queue_len < 1 {
            return Err(ParamsError::InvalidSubQueueLen(self.sub_queue_len));
        }

        if self.arm_mover_timeout_ms < 1 {
            return Err(ParamsError::InvalidArmMoverTimeout(self.arm_mover_timeout_ms));
        }

        Ok(())
    }

    /// Period between status reports, or an error if `stats_period_s` is out of range.
    pub fn stats_period(&self) -> Result<Duration, ParamsError> {
        self.validate()?;
        Ok(Duration::from_secs_f64(self.stats_period_s))
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

fn default_sub_queue_len() -> i32 {
    DEFAULT_SUB_QUEUE_LEN
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
