//! # Watcher
//!
//! Serialises the two sensor streams into a single sequence of decisions. Joint updates only ever
//! update the motion classifier, frames trigger a centering decision against whatever the motion
//! classifier last settled on.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::trace;
use serde::Serialize;

use crate::{
    centering::{ArmMover, CenteringDispatcher, DispatchOutcome, DispatchStats},
    motion_class::MotionClassifier,
    params::LookAwayExecParams,
    sens_client::SensEvent,
};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Owner of the motion state and the centering dispatcher.
pub struct Watcher<M: ArmMover> {
    motion_class: MotionClassifier,

    dispatcher: CenteringDispatcher<M>,

    num_joint_samples: u64,
}

/// Snapshot of the watcher's counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct WatchStats {
    pub num_joint_samples: u64,
    pub is_moving: bool,
    pub dispatch: DispatchStats,
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<M: ArmMover> Watcher<M> {
    pub fn new(params: &LookAwayExecParams, mover: M) -> Self {
        Self {
            motion_class: MotionClassifier::new(params.motion_class.clone()),
            dispatcher: CenteringDispatcher::new(&params.centering, mover),
            num_joint_samples: 0,
        }
    }

    /// Handle a single sensor event.
    ///
    /// Returns the dispatch outcome if the event was a frame.
    pub fn handle(&mut self, event: &SensEvent) -> Option<DispatchOutcome> {
        match event {
            SensEvent::Joints(pos) => {
                self.num_joint_samples += 1;
                self.motion_class.observe(pos);
                None
            }
            SensEvent::Frame(frame) => {
                let outcome = self.dispatcher.on_frame(frame, &self.motion_class);
                trace!("Frame outcome: {:?}", outcome);
                Some(outcome)
            }
        }
    }

    pub fn motion_class(&self) -> &MotionClassifier {
        &self.motion_class
    }

    pub fn dispatcher(&self) -> &CenteringDispatcher<M> {
        &self.dispatcher
    }

    pub fn stats(&self) -> WatchStats {
        WatchStats {
            num_joint_samples: self.num_joint_samples,
            is_moving: self.motion_class.is_moving(),
            dispatch: self.dispatcher.stats(),
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        centering::{tests::RecordingMover, ArmState},
        motion_class::JointPosition,
    };
    use comms_if::eqpt::cam::ImageFrame;

    fn params() -> LookAwayExecParams {
        util::params::from_str(include_str!("../../params/look_away_exec.toml")).unwrap()
    }

    fn joints(j1: f64, j2: f64) -> SensEvent {
        SensEvent::Joints(JointPosition([j1, j2]))
    }

    fn frame(data: &[u8]) -> SensEvent {
        SensEvent::Frame(ImageFrame::new(1, data.len() as u32, data.to_vec()).unwrap())
    }

    #[test]
    fn test_joints_only_update_state() {
        let mut w = Watcher::new(&params(), RecordingMover::default());

        assert_eq!(w.handle(&joints(0.0, 0.0)), None);
        assert_eq!(w.handle(&joints(0.2, 0.0)), None);

        assert!(w.motion_class().is_moving());
        assert!(w.dispatcher().mover().requests.is_empty());
        assert_eq!(w.stats().num_joint_samples, 2);
        assert_eq!(w.stats().dispatch.num_frames, 0);
    }

    #[test]
    fn test_frame_uses_latest_motion_state() {
        let mut w = Watcher::new(&params(), RecordingMover::default());

        w.handle(&joints(0.0, 0.0));
        w.handle(&joints(0.1, 0.0));
        assert_eq!(
            w.handle(&frame(&[4, 4, 4, 4])),
            Some(DispatchOutcome::Suppressed(ArmState::Moving))
        );

        // Arm settles, the same scene now triggers centering
        w.handle(&joints(0.1, 0.0));
        assert!(matches!(
            w.handle(&frame(&[4, 4, 4, 4])),
            Some(DispatchOutcome::Sent { .. })
        ));

        assert_eq!(
            w.stats(),
            WatchStats {
                num_joint_samples: 3,
                is_moving: false,
                dispatch: DispatchStats {
                    num_frames: 2,
                    num_moving: 1,
                    num_idle_non_uniform: 0,
                    num_sent: 1,
                    num_failed: 0,
                },
            }
        );
    }

    #[test]
    fn test_failed_request_does_not_stop_processing() {
        let mut w = Watcher::new(
            &params(),
            RecordingMover {
                fail_on: vec![0],
                ..Default::default()
            },
        );

        w.handle(&joints(0.0, 0.0));
        assert!(matches!(
            w.handle(&frame(&[0, 0])),
            Some(DispatchOutcome::Failed(_))
        ));
        assert_eq!(
            w.handle(&frame(&[0, 1])),
            Some(DispatchOutcome::Suppressed(ArmState::IdleNonUniform))
        );
        assert!(matches!(
            w.handle(&frame(&[0, 0])),
            Some(DispatchOutcome::Sent { .. })
        ));
        assert_eq!(w.dispatcher().mover().requests.len(), 2);
    }
}
