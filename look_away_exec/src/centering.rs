//! # Centering Dispatcher
//!
//! Combines the motion and frame classifiers, and moves the arm back to its centre position
//! whenever it is idle and the camera sees a uniform scene.
//!
//! The decision is made on every frame. There is no debouncing, if the arm stays idle in front of
//! a uniform scene a centering request is sent for every frame. Failed requests are logged and
//! never retried, the next frame is handled as normal.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::fmt::Display;

use comms_if::eqpt::{arm::GoToPosition, cam::ImageFrame};
use log::{debug, error, info};
use serde::{Deserialize, Serialize};

use crate::{
    frame_class::FrameClassifier,
    motion_class::{MotionClassifier, NUM_TRACKED_JOINTS},
};

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Default centre position of the tracked joints.
///
/// Units: radians
pub const DEFAULT_CENTRE_POS_RAD: [f64; NUM_TRACKED_JOINTS] = [1.57, 1.57];

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Something which can move the arm to a position, normally the arm mover service.
pub trait ArmMover {
    type Error: Display;

    /// Request the arm moves to the given position, returning the feedback message from the
    /// mover on success.
    fn go_to_position(&mut self, request: &GoToPosition) -> Result<String, Self::Error>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Parameters for the centering dispatcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CenteringParams {
    /// Position the tracked joints are moved to.
    ///
    /// Units: radians
    pub centre_pos_rad: [f64; NUM_TRACKED_JOINTS],
}

/// Counters for the decisions the dispatcher has made.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct DispatchStats {
    pub num_frames: u64,
    pub num_moving: u64,
    pub num_idle_non_uniform: u64,
    pub num_sent: u64,
    pub num_failed: u64,
}

/// Sends centering requests when the arm is idle in front of a uniform scene.
pub struct CenteringDispatcher<M: ArmMover> {
    request: GoToPosition,

    frame_class: FrameClassifier,

    mover: M,

    stats: DispatchStats,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// State of the arm as seen by a single dispatch decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArmState {
    /// The arm is moving, whatever the camera sees
    Moving,

    /// The arm is idle and the camera sees something
    IdleNonUniform,

    /// The arm is idle and the camera sees nothing of interest
    IdleUniform,
}

/// The result of handling a single frame.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// No request was needed for the given state
    Suppressed(ArmState),

    /// The centering request was accepted by the mover
    Sent { msg_feedback: String },

    /// The centering request failed, holds a description of the failure
    Failed(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl Default for CenteringParams {
    fn default() -> Self {
        Self {
            centre_pos_rad: DEFAULT_CENTRE_POS_RAD,
        }
    }
}

impl ArmState {
    /// Derive the state from the two classifier outputs.
    pub fn from_classes(is_moving: bool, is_uniform: bool) -> Self {
        match (is_moving, is_uniform) {
            (true, _) => ArmState::Moving,
            (false, false) => ArmState::IdleNonUniform,
            (false, true) => ArmState::IdleUniform,
        }
    }
}

impl<M: ArmMover> CenteringDispatcher<M> {
    /// Create a new dispatcher which sends requests through the given mover.
    pub fn new(params: &CenteringParams, mover: M) -> Self {
        Self {
            request: GoToPosition {
                joint_1: params.centre_pos_rad[0],
                joint_2: params.centre_pos_rad[1],
            },
            frame_class: FrameClassifier,
            mover,
            stats: DispatchStats::default(),
        }
    }

    /// Handle a new frame.
    ///
    /// `motion` is read as it currently stands, the dispatcher never updates it.
    pub fn on_frame(&mut self, frame: &ImageFrame, motion: &MotionClassifier) -> DispatchOutcome {
        self.stats.num_frames += 1;

        let state = ArmState::from_classes(motion.is_moving(), self.frame_class.classify(frame));

        match state {
            ArmState::Moving => {
                self.stats.num_moving += 1;
                return DispatchOutcome::Suppressed(state);
            }
            ArmState::IdleNonUniform => {
                self.stats.num_idle_non_uniform += 1;
                return DispatchOutcome::Suppressed(state);
            }
            ArmState::IdleUniform => (),
        }

        info!("Moving the arm to the centre");

        match self.mover.go_to_position(&self.request) {
            Ok(msg_feedback) => {
                debug!("Arm mover feedback: {}", msg_feedback);
                self.stats.num_sent += 1;
                DispatchOutcome::Sent { msg_feedback }
            }
            Err(e) => {
                error!("Failed to move the arm to the centre: {}", e);
                self.stats.num_failed += 1;
                DispatchOutcome::Failed(e.to_string())
            }
        }
    }

    /// The centering request this dispatcher sends.
    pub fn request(&self) -> &GoToPosition {
        &self.request
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn mover(&self) -> &M {
        &self.mover
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::motion_class::{JointPosition, MotionClassParams};

    /// Mover which records every request and fails the requests whose index is in `fail_on`.
    #[derive(Default)]
    pub(crate) struct RecordingMover {
        pub requests: Vec<GoToPosition>,
        pub fail_on: Vec<usize>,
    }

    impl ArmMover for RecordingMover {
        type Error = String;

        fn go_to_position(&mut self, request: &GoToPosition) -> Result<String, Self::Error> {
            let idx = self.requests.len();
            self.requests.push(*request);

            if self.fail_on.contains(&idx) {
                Err("service unavailable".into())
            } else {
                Ok("done".into())
            }
        }
    }

    fn frame(data: &[u8]) -> ImageFrame {
        ImageFrame::new(2, 2, data.to_vec()).unwrap()
    }

    fn motion_after(samples: &[[f64; 2]]) -> MotionClassifier {
        let mut mc = MotionClassifier::new(MotionClassParams::default());
        for s in samples {
            mc.observe(&JointPosition(*s));
        }
        mc
    }

    fn dispatcher(mover: RecordingMover) -> CenteringDispatcher<RecordingMover> {
        CenteringDispatcher::new(&CenteringParams::default(), mover)
    }

    #[test]
    fn test_arm_state() {
        assert_eq!(ArmState::from_classes(true, true), ArmState::Moving);
        assert_eq!(ArmState::from_classes(true, false), ArmState::Moving);
        assert_eq!(ArmState::from_classes(false, false), ArmState::IdleNonUniform);
        assert_eq!(ArmState::from_classes(false, true), ArmState::IdleUniform);
    }

    #[test]
    fn test_idle_uniform_sends_centre() {
        let motion = motion_after(&[[0.0, 0.0], [0.0, 0.0]]);
        let mut cd = dispatcher(RecordingMover::default());

        assert_eq!(
            cd.on_frame(&frame(&[3, 3, 3, 3]), &motion),
            DispatchOutcome::Sent {
                msg_feedback: "done".into()
            }
        );
        assert_eq!(
            cd.mover().requests,
            vec![GoToPosition {
                joint_1: 1.57,
                joint_2: 1.57
            }]
        );
    }

    #[test]
    fn test_moving_suppresses() {
        let motion = motion_after(&[[0.0, 0.0], [0.1, 0.0]]);
        let mut cd = dispatcher(RecordingMover::default());

        assert_eq!(
            cd.on_frame(&frame(&[3, 3, 3, 3]), &motion),
            DispatchOutcome::Suppressed(ArmState::Moving)
        );
        assert!(cd.mover().requests.is_empty());
    }

    #[test]
    fn test_non_uniform_suppresses() {
        let motion = motion_after(&[[0.0, 0.0]]);
        let mut cd = dispatcher(RecordingMover::default());

        assert!(matches!(
            cd.on_frame(&frame(&[5, 5, 5, 5]), &motion),
            DispatchOutcome::Sent { .. }
        ));
        assert_eq!(
            cd.on_frame(&frame(&[5, 9, 5, 5]), &motion),
            DispatchOutcome::Suppressed(ArmState::IdleNonUniform)
        );
        assert_eq!(cd.mover().requests.len(), 1);
    }

    #[test]
    fn test_no_debounce() {
        let motion = motion_after(&[[0.0, 0.0]]);
        let mut cd = dispatcher(RecordingMover::default());

        for _ in 0..3 {
            cd.on_frame(&frame(&[1, 1, 1, 1]), &motion);
        }

        assert_eq!(cd.mover().requests.len(), 3);
        assert_eq!(cd.stats().num_sent, 3);
    }

    #[test]
    fn test_failure_not_retried() {
        let motion = motion_after(&[[0.0, 0.0]]);
        let mut cd = dispatcher(RecordingMover {
            fail_on: vec![0],
            ..Default::default()
        });

        assert_eq!(
            cd.on_frame(&frame(&[0, 0, 0, 0]), &motion),
            DispatchOutcome::Failed("service unavailable".into())
        );
        assert_eq!(cd.mover().requests.len(), 1);

        // The next frame goes through as normal
        assert!(matches!(
            cd.on_frame(&frame(&[0, 0, 0, 0]), &motion),
            DispatchOutcome::Sent { .. }
        ));
        assert_eq!(cd.mover().requests.len(), 2);

        assert_eq!(
            cd.stats(),
            DispatchStats {
                num_frames: 2,
                num_moving: 0,
                num_idle_non_uniform: 0,
                num_sent: 1,
                num_failed: 1,
            }
        );
    }

    #[test]
    fn test_custom_centre() {
        let params = CenteringParams {
            centre_pos_rad: [0.5, -0.25],
        };
        let cd = CenteringDispatcher::new(&params, RecordingMover::default());

        assert_eq!(
            cd.request(),
            &GoToPosition {
                joint_1: 0.5,
                joint_2: -0.25
            }
        );
    }
}
