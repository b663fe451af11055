//! # Arm Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Joint telemetry published by the arm.
///
/// All vectors are indexed by joint, in the same order as `name`. `velocity` and `effort` may be
/// empty if the arm doesn't report them.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct JointStateMsg {
    /// UTC timestamp at which the joint positions were sampled
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Names of the joints
    #[serde(default)]
    pub name: Vec<String>,

    /// Position of each joint.
    ///
    /// Units: radians
    pub position: Vec<f64>,

    /// Velocity of each joint.
    ///
    /// Units: radians/second
    #[serde(default)]
    pub velocity: Vec<f64>,

    /// Effort applied by each joint.
    ///
    /// Units: newton meters
    #[serde(default)]
    pub effort: Vec<f64>,
}

/// Request sent to the arm mover service to move the arm to a set of joint angles.
///
/// The service is expected to clamp the angles to the arm's limits before moving.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct GoToPosition {
    /// Demanded position of the first joint.
    ///
    /// Units: radians
    pub joint_1: f64,

    /// Demanded position of the second joint.
    ///
    /// Units: radians
    pub joint_2: f64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Response from the arm mover service to a [`GoToPosition`] request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub enum GoToPositionResponse {
    /// The arm has been moved, `msg_feedback` describes the final joint angles
    Moved { msg_feedback: String },

    /// The request was refused by the service
    Rejected { msg_feedback: String },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl JointStateMsg {
    /// Build a message for the given positions, timestamped now, with no names, velocities or
    /// efforts.
    pub fn from_positions(position: Vec<f64>) -> Self {
        Self {
            timestamp: Utc::now(),
            name: Vec::new(),
            position,
            velocity: Vec::new(),
            effort: Vec::new(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_state_optional_fields() {
        let msg: JointStateMsg =
            serde_json::from_str(r#"{"timestamp": 1600000000000, "position": [0.1, 0.2, 0.3]}"#)
                .unwrap();

        assert_eq!(msg.position, vec![0.1, 0.2, 0.3]);
        assert!(msg.name.is_empty());
        assert!(msg.velocity.is_empty());
        assert!(msg.effort.is_empty());
        assert_eq!(msg.timestamp.timestamp_millis(), 1_600_000_000_000);
    }

    #[test]
    fn test_go_to_position_response_wire_format() {
        let resp = GoToPositionResponse::Moved {
            msg_feedback: "Joint angles set to: 1.57, 1.57".into(),
        };

        assert_eq!(
            serde_json::to_string(&resp).unwrap(),
            r#"{"Moved":{"msg_feedback":"Joint angles set to: 1.57, 1.57"}}"#
        );
    }
}
