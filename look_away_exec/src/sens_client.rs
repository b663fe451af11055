//! # Sensor Client
//!
//! Subscribes to the arm's joint telemetry and to the camera's raw frames. The two streams are
//! independent, messages within each stream are returned in the order they arrive.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use std::convert::TryFrom;

use comms_if::{
    eqpt::{
        arm::JointStateMsg,
        cam::{ImageFrame, ImageMsg},
    },
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};
use log::warn;

use crate::{motion_class::JointPosition, params::LookAwayExecParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Subscriber for the joint state and camera frame streams.
pub struct SensClient {
    joints_socket: MonitoredSocket,

    frames_socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// A decoded message from one of the sensor streams.
#[derive(Debug, Clone, PartialEq)]
pub enum SensEvent {
    /// New position of the tracked joints
    Joints(JointPosition),

    /// New camera frame
    Frame(ImageFrame),
}

#[derive(Debug, thiserror::Error)]
pub enum SensClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("Could not poll the sensor sockets: {0}")]
    PollError(zmq::Error),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SensClient {
    /// Create a new sensor client.
    ///
    /// Doesn't wait for the publishers to be available.
    pub fn new(ctx: &zmq::Context, params: &LookAwayExecParams) -> Result<Self, SensClientError> {
        let joints_socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            sub_socket_options(params),
            &params.joint_states_endpoint,
        )
        .map_err(SensClientError::SocketError)?;
        let frames_socket = MonitoredSocket::new(
            ctx,
            zmq::SUB,
            sub_socket_options(params),
            &params.frames_endpoint,
        )
        .map_err(SensClientError::SocketError)?;

        Ok(Self {
            joints_socket,
            frames_socket,
        })
    }

    /// Wait up to `timeout_ms` for sensor data, returning the events that arrived.
    ///
    /// At most one message is taken from each stream per call, a joint update is always returned
    /// before a frame. Messages which can't be decoded are logged and dropped.
    pub fn poll(&mut self, timeout_ms: i64) -> Result<Vec<SensEvent>, SensClientError> {
        let (joints_ready, frames_ready) = {
            let mut items = [
                self.joints_socket.as_poll_item(zmq::POLLIN),
                self.frames_socket.as_poll_item(zmq::POLLIN),
            ];

            zmq::poll(&mut items, timeout_ms).map_err(SensClientError::PollError)?;

            (items[0].is_readable(), items[1].is_readable())
        };

        let mut events = Vec::with_capacity(2);

        if joints_ready {
            if let Some(s) = recv_str(&self.joints_socket, "joint state") {
                if let Some(e) = decode_joints(&s) {
                    events.push(e);
                }
            }
        }

        if frames_ready {
            if let Some(s) = recv_str(&self.frames_socket, "frame") {
                if let Some(e) = decode_frame(&s) {
                    events.push(e);
                }
            }
        }

        Ok(events)
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Options for a sensor subscription.
///
/// The queue is kept short so frames are judged against a recent motion state rather than piling
/// up while the arm mover is being waited on.
fn sub_socket_options(params: &LookAwayExecParams) -> SocketOptions {
    SocketOptions {
        block_on_first_connect: false,
        linger: 0,
        recv_hwm: params.sub_queue_len,
        ..Default::default()
    }
}

/// Take a waiting message off the socket without blocking.
fn recv_str(socket: &MonitoredSocket, kind: &str) -> Option<String> {
    match socket.recv_string(zmq::DONTWAIT) {
        Ok(Ok(s)) => Some(s),
        Ok(Err(_)) => {
            warn!("Recieved a {} message which was not valid UTF-8", kind);
            None
        }
        Err(zmq::Error::EAGAIN) => None,
        Err(e) => {
            warn!("Could not recieve a {} message: {}", kind, e);
            None
        }
    }
}

/// Decode a joint state message into the tracked joint position.
pub(crate) fn decode_joints(msg_str: &str) -> Option<SensEvent> {
    let msg: JointStateMsg = match serde_json::from_str(msg_str) {
        Ok(m) => m,
        Err(e) => {
            warn!("Could not deserialize joint state: {}", e);
            return None;
        }
    };

    match JointPosition::from_joint_state(&msg) {
        Some(p) => Some(SensEvent::Joints(p)),
        None => {
            warn!(
                "Joint state holds {} positions, at least 2 are needed",
                msg.position.len()
            );
            None
        }
    }
}

/// Decode and validate an image message.
pub(crate) fn decode_frame(msg_str: &str) -> Option<SensEvent> {
    let msg: ImageMsg = match serde_json::from_str(msg_str) {
        Ok(m) => m,
        Err(e) => {
            warn!("Could not deserialize frame: {}", e);
            return None;
        }
    };

    match ImageFrame::try_from(&msg) {
        Ok(f) => Some(SensEvent::Frame(f)),
        Err(e) => {
            warn!("Rejected frame: {}", e);
            None
        }
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
