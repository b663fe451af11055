//! # Frame Classifier
//!
//! Decides whether a camera frame is uniform, i.e. whether every byte of the frame is the same as
//! its first byte. A uniform frame means the camera is looking at nothing of interest.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::eqpt::cam::ImageFrame;

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Per-frame uniformity classifier. Holds no state between frames.
#[derive(Debug, Default, Clone, Copy)]
pub struct FrameClassifier;

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl FrameClassifier {
    /// Returns `true` if the frame is uniform.
    ///
    /// Scans all `height * step` bytes, stopping at the first byte which differs from the first.
    /// An empty frame is uniform.
    pub fn classify(&self, frame: &ImageFrame) -> bool {
        match frame.bytes().split_first() {
            Some((first, rest)) => rest.iter().all(|b| b == first),
            None => true,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
