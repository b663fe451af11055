//! # Motion Classifier
//!
//! Decides whether the arm is moving from its joint telemetry.
//!
//! Only the first [`NUM_TRACKED_JOINTS`] joints are tracked, any further joints reported by the
//! arm are ignored. A sample is "moving" if either tracked joint differs from the reference
//! position by at least the tolerance, in which case the reference becomes that sample. Idle
//! samples leave the reference untouched, so slow drift below the tolerance accumulates until it
//! is seen as movement.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::arm::JointStateMsg;
use log::trace;
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Number of joints whose positions are tracked.
pub const NUM_TRACKED_JOINTS: usize = 2;

/// Default per-joint tolerance.
///
/// Units: radians
pub const DEFAULT_TOLERANCE_RAD: f64 = 0.0005;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the motion classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MotionClassParams {
    /// Change in a joint's position below which the joint is considered not to have moved.
    ///
    /// Units: radians
    pub tolerance_rad: f64,
}

/// Position of the tracked joints.
///
/// Units: radians
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct JointPosition(pub [f64; NUM_TRACKED_JOINTS]);

/// Tracks the arm's joint positions and whether it is moving.
///
/// The classifier is the only writer of the motion state, other components read it through
/// [`MotionClassifier::is_moving`].
#[derive(Debug, Clone)]
pub struct MotionClassifier {
    params: MotionClassParams,

    /// Position at which the arm was last judged to be moving, (0, 0) before any movement.
    last_known_pos: JointPosition,

    is_moving: bool,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for MotionClassParams {
    fn default() -> Self {
        Self {
            tolerance_rad: DEFAULT_TOLERANCE_RAD,
        }
    }
}

impl JointPosition {
    /// Take the tracked joint positions from a joint state message.
    ///
    /// Returns `None` if the message holds fewer positions than there are tracked joints.
    pub fn from_joint_state(msg: &JointStateMsg) -> Option<Self> {
        match msg.position.as_slice() {
            [j1, j2, ..] => Some(Self([*j1, *j2])),
            _ => None,
        }
    }
}

impl MotionClassifier {
    /// Create a new classifier with its reference position at the origin.
    pub fn new(params: MotionClassParams) -> Self {
        Self {
            params,
            last_known_pos: JointPosition::default(),
            is_moving: false,
        }
    }

    /// Observe a new joint position sample, returning whether the arm is now moving.
    pub fn observe(&mut self, pos: &JointPosition) -> bool {
        let tol = self.params.tolerance_rad;

        let still = pos
            .0
            .iter()
            .zip(self.last_known_pos.0.iter())
            .all(|(cur, last)| (cur - last).abs() < tol);

        if still {
            self.is_moving = false;
        } else {
            trace!(
                "Arm moved from {:?} to {:?}",
                self.last_known_pos.0,
                pos.0
            );
            self.is_moving = true;
            self.last_known_pos = *pos;
        }

        self.is_moving
    }

    /// Whether the last observed sample showed the arm moving.
    pub fn is_moving(&self) -> bool {
        self.is_moving
    }

    /// The reference position samples are compared against.
    pub fn last_known_pos(&self) -> JointPosition {
        self.last_known_pos
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> MotionClassifier {
        MotionClassifier::new(MotionClassParams::default())
    }

    #[test]
    fn test_initial_state() {
        let mc = classifier();
        assert!(!mc.is_moving());
        assert_eq!(mc.last_known_pos(), JointPosition([0.0, 0.0]));
    }

    #[test]
    fn test_within_tolerance_is_idle() {
        let mut mc = classifier();

        for pos in &[[0.0, 0.0], [0.0004, -0.0004], [-0.00049, 0.00049]] {
            assert!(!mc.observe(&JointPosition(*pos)));
            assert_eq!(mc.last_known_pos(), JointPosition([0.0, 0.0]));
        }
    }

    #[test]
    fn test_either_joint_moving() {
        let mut mc = classifier();

        assert!(mc.observe(&JointPosition([0.1, 0.0])));
        assert_eq!(mc.last_known_pos(), JointPosition([0.1, 0.0]));

        assert!(mc.observe(&JointPosition([0.1, -0.2])));
        assert_eq!(mc.last_known_pos(), JointPosition([0.1, -0.2]));

        // Same position again, so idle and the reference stays put
        assert!(!mc.observe(&JointPosition([0.1, -0.2])));
        assert!(!mc.is_moving());
        assert_eq!(mc.last_known_pos(), JointPosition([0.1, -0.2]));
    }

    #[test]
    fn test_tolerance_boundary_is_moving() {
        let mut mc = MotionClassifier::new(MotionClassParams { tolerance_rad: 0.5 });

        assert!(mc.observe(&JointPosition([0.0, 0.5])));
        assert_eq!(mc.last_known_pos(), JointPosition([0.0, 0.5]));
    }

    #[test]
    fn test_sliding_reference() {
        let mut mc = classifier();

        // Drift of 0.0003 per sample isn't movement on its own, but it is measured against the
        // last moving position so the second step crosses the tolerance.
        assert!(!mc.observe(&JointPosition([0.0003, 0.0])));
        assert!(mc.observe(&JointPosition([0.0006, 0.0])));
        assert_eq!(mc.last_known_pos(), JointPosition([0.0006, 0.0]));
        assert!(!mc.observe(&JointPosition([0.0009, 0.0])));
        assert_eq!(mc.last_known_pos(), JointPosition([0.0006, 0.0]));
    }

    #[test]
    fn test_first_sample_away_from_origin() {
        let mut mc = classifier();

        // Resting at the centre still reads as moving the first time
        assert!(mc.observe(&JointPosition([1.57, 1.57])));
        assert!(!mc.observe(&JointPosition([1.57, 1.57])));
    }

    #[test]
    fn test_from_joint_state() {
        let msg = JointStateMsg::from_positions(vec![0.1, 0.2, 0.3, 0.4]);
        assert_eq!(
            JointPosition::from_joint_state(&msg),
            Some(JointPosition([0.1, 0.2]))
        );

        let short = JointStateMsg::from_positions(vec![0.1]);
        assert_eq!(JointPosition::from_joint_state(&short), None);
    }
}
