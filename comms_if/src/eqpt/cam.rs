//! # Camera Equipment Communications Module

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use base64::DecodeError;
use chrono::{serde::ts_milliseconds, DateTime, Utc};
use serde::{Deserialize, Serialize};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// A serialisable raw (uncompressed) camera frame, as published by the camera.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ImageMsg {
    /// UTC timestamp at which the frame was acquired
    #[serde(with = "ts_milliseconds")]
    pub timestamp: DateTime<Utc>,

    /// Height of the image in rows
    pub height: u32,

    /// Width of the image in pixels
    pub width: u32,

    /// Pixel encoding of the data, for example `"rgb8"` or `"mono8"`
    pub encoding: String,

    /// Whether multi-byte pixel components are big endian
    #[serde(default)]
    pub is_bigendian: bool,

    /// Length of a full row in bytes
    pub step: u32,

    /// The raw pixel data, row major, encoded in base64.
    pub b64_data: String,
}

/// A decoded camera frame.
///
/// The frame is guaranteed to hold at least `height * step` bytes of data, so it can be scanned
/// without bounds checks failing. Any bytes past `height * step` are never exposed.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageFrame {
    height: u32,
    step: u32,
    data: Vec<u8>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Reasons a frame can be rejected.
#[derive(Debug, thiserror::Error, Clone, PartialEq)]
pub enum FrameError {
    #[error("Failed to decode frame data from base64: {0}")]
    InvalidBase64(DecodeError),

    #[error("Frame size overflows (height = {height}, step = {step})")]
    SizeOverflow { height: u32, step: u32 },

    #[error("Frame buffer holds {actual} bytes but height * step is {expected}")]
    BufferTooShort { expected: usize, actual: usize },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ImageMsg {
    /// Build a message from raw frame data, timestamped now.
    pub fn from_raw(height: u32, width: u32, encoding: &str, step: u32, data: &[u8]) -> Self {
        Self {
            timestamp: Utc::now(),
            height,
            width,
            encoding: encoding.into(),
            is_bigendian: false,
            step,
            b64_data: base64::encode(data),
        }
    }
}

impl ImageFrame {
    /// Create a new frame, rejecting buffers shorter than `height * step`.
    pub fn new(height: u32, step: u32, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = (height as usize)
            .checked_mul(step as usize)
            .ok_or(FrameError::SizeOverflow { height, step })?;

        if data.len() < expected {
            return Err(FrameError::BufferTooShort {
                expected,
                actual: data.len(),
            });
        }

        Ok(Self { height, step, data })
    }

    /// Height of the frame in rows
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Length of a row in bytes
    pub fn step(&self) -> u32 {
        self.step
    }

    /// The `height * step` bytes of the frame.
    pub fn bytes(&self) -> &[u8] {
        // Checked in `new`
        &self.data[..self.height as usize * self.step as usize]
    }
}

impl TryFrom<&ImageMsg> for ImageFrame {
    type Error = FrameError;

    fn try_from(msg: &ImageMsg) -> Result<Self, Self::Error> {
        let data = base64::decode(&msg.b64_data).map_err(FrameError::InvalidBase64)?;

        ImageFrame::new(msg.height, msg.step, data)
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_buffer_rejected() {
        assert_eq!(
            ImageFrame::new(2, 3, vec![0; 5]),
            Err(FrameError::BufferTooShort {
                expected: 6,
                actual: 5
            })
        );
    }

    #[test]
    fn test_trailing_bytes_hidden() {
        let frame = ImageFrame::new(1, 2, vec![7, 7, 1, 2]).unwrap();
        assert_eq!(frame.bytes(), &[7, 7]);

        let empty = ImageFrame::new(0, 640, Vec::new()).unwrap();
        assert!(empty.bytes().is_empty());
    }

    #[test]
    fn test_frame_from_msg() {
        let msg = ImageMsg::from_raw(2, 2, "mono8", 2, &[1, 2, 3, 4]);
        let frame = ImageFrame::try_from(&msg).unwrap();
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.step(), 2);
        assert_eq!(frame.bytes(), &[1, 2, 3, 4]);

        let mut bad = msg.clone();
        bad.b64_data = "not base64!".into();
        assert!(matches!(
            ImageFrame::try_from(&bad),
            Err(FrameError::InvalidBase64(_))
        ));

        let mut short = msg;
        short.height = 3;
        assert!(matches!(
            ImageFrame::try_from(&short),
            Err(FrameError::BufferTooShort { .. })
        ));
    }
}
