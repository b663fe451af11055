//! # Arm Mover Client
//!
//! This module provides networking abstractions to connect to the arm mover service, which moves
//! the arm to a requested set of joint angles.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use comms_if::{
    eqpt::arm::{GoToPosition, GoToPositionResponse},
    net::{zmq, MonitoredSocket, MonitoredSocketError, SocketOptions},
};

use crate::{centering::ArmMover, params::LookAwayExecParams};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Client for the arm mover service.
pub struct ArmMoverClient {
    socket: MonitoredSocket,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

#[derive(thiserror::Error, Debug)]
pub enum ArmMoverClientError {
    #[error("Socket error: {0}")]
    SocketError(MonitoredSocketError),

    #[error("The client is not connected to the arm mover")]
    NotConnected,

    #[error("Could not send the request to the arm mover: {0}")]
    SendError(zmq::Error),

    #[error("The arm mover did not respond in time")]
    Timeout,

    #[error("Could not recieve a message from the arm mover: {0}")]
    RecvError(zmq::Error),

    #[error("The arm mover responded with a message which was not valid UTF-8")]
    NonUtf8Response,

    #[error("Could not serialize the request: {0}")]
    SerializationError(serde_json::Error),

    #[error("Could not deserialize the response from the arm mover: {0}")]
    DeserializeError(serde_json::Error),

    #[error("The arm mover rejected the request: {0}")]
    Rejected(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl ArmMoverClient {
    /// Create a new instance of the arm mover client.
    ///
    /// This doesn't wait for the arm mover to be available, zmq keeps trying to connect in the
    /// background and requests made before then fail with `NotConnected`.
    pub fn new(
        ctx: &zmq::Context,
        params: &LookAwayExecParams,
    ) -> Result<Self, ArmMoverClientError> {
        let socket_options = SocketOptions {
            block_on_first_connect: false,
            connect_timeout: 1000,
            heartbeat_ivl: 500,
            heartbeat_ttl: 1000,
            heartbeat_timeout: 1000,
            linger: 1,
            recv_timeout: params.arm_mover_timeout_ms,
            send_timeout: params.arm_mover_timeout_ms,
            req_correlate: true,
            req_relaxed: true,
            ..Default::default()
        };

        let socket = MonitoredSocket::new(
            ctx,
            zmq::REQ,
            socket_options,
            &params.arm_mover_endpoint,
        )
        .map_err(ArmMoverClientError::SocketError)?;

        Ok(Self { socket })
    }

    /// Send a request to the arm mover and wait for its response.
    ///
    /// Waits at most the configured timeout for the response. Since the socket is relaxed a new
    /// request can be sent after a timeout, the late response to the old one is discarded by zmq.
    pub fn send_request(
        &mut self,
        request: &GoToPosition,
    ) -> Result<GoToPositionResponse, ArmMoverClientError> {
        if !self.socket.connected() {
            return Err(ArmMoverClientError::NotConnected);
        }

        let request_str =
            serde_json::to_string(request).map_err(ArmMoverClientError::SerializationError)?;

        self.socket
            .send(request_str.as_str(), 0)
            .map_err(send_error)?;

        let response_str = match self.socket.recv_string(0) {
            Ok(Ok(s)) => s,
            Ok(Err(_)) => return Err(ArmMoverClientError::NonUtf8Response),
            Err(zmq::Error::EAGAIN) => return Err(ArmMoverClientError::Timeout),
            Err(e) => return Err(ArmMoverClientError::RecvError(e)),
        };

        serde_json::from_str(&response_str).map_err(ArmMoverClientError::DeserializeError)
    }
}

impl ArmMover for ArmMoverClient {
    type Error = ArmMoverClientError;

    fn go_to_position(&mut self, request: &GoToPosition) -> Result<String, Self::Error> {
        match self.send_request(request)? {
            GoToPositionResponse::Moved { msg_feedback } => Ok(msg_feedback),
            GoToPositionResponse::Rejected { msg_feedback } => {
                Err(ArmMoverClientError::Rejected(msg_feedback))
            }
        }
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// A send which hits the socket's send timeout is reported the same way as a late response.
fn send_error(e: zmq::Error) -> ArmMoverClientError {
    match e {
        zmq::Error::EAGAIN => ArmMoverClientError::Timeout,
        e => ArmMoverClientError::SendError(e),
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::{
        thread,
        time::{Duration, Instant},
    };

    const REQUEST: GoToPosition = GoToPosition {
        joint_1: 1.57,
        joint_2: 1.57,
    };

    /// Reply sent by the scripted arm mover after an optional delay.
    struct Reply {
        delay: Duration,
        body: String,
    }

    fn moved(feedback: &str) -> Reply {
        Reply {
            delay: Duration::from_millis(0),
            body: serde_json::to_string(&GoToPositionResponse::Moved {
                msg_feedback: feedback.into(),
            })
            .unwrap(),
        }
    }

    /// Start a REP server which answers each request with the next scripted reply, and a client
    /// connected to it.
    fn serve(
        replies: Vec<Reply>,
        timeout_ms: i32,
    ) -> (ArmMoverClient, thread::JoinHandle<Vec<GoToPosition>>) {
        let ctx = zmq::Context::new();

        let server = ctx.socket(zmq::REP).unwrap();
        server.set_linger(0).unwrap();
        server.bind("tcp://127.0.0.1:*").unwrap();
        let endpoint = server.get_last_endpoint().unwrap().unwrap();

        let handle = thread::spawn(move || {
            let mut received = Vec::new();
            for reply in replies {
                let req = server.recv_string(0).unwrap().unwrap();
                received.push(serde_json::from_str(&req).unwrap());
                thread::sleep(reply.delay);
                server.send(reply.body.as_str(), 0).unwrap();
            }
            received
        });

        let mut params: LookAwayExecParams =
            util::params::from_str(include_str!("../../params/look_away_exec.toml")).unwrap();
        params.arm_mover_endpoint = endpoint;
        params.arm_mover_timeout_ms = timeout_ms;

        let client = ArmMoverClient::new(&ctx, &params).unwrap();

        let start = Instant::now();
        while !client.socket.connected() {
            assert!(
                start.elapsed() < Duration::from_secs(2),
                "client never connected"
            );
            thread::sleep(Duration::from_millis(10));
        }

        (client, handle)
    }

    #[test]
    fn test_moved() {
        let (mut client, server) = serve(vec![moved("at centre")], 1000);

        assert_eq!(client.go_to_position(&REQUEST).unwrap(), "at centre");
        assert_eq!(server.join().unwrap(), vec![REQUEST]);
    }

    #[test]
    fn test_rejected() {
        let rejected = Reply {
            delay: Duration::from_millis(0),
            body: serde_json::to_string(&GoToPositionResponse::Rejected {
                msg_feedback: "busy".into(),
            })
            .unwrap(),
        };
        let (mut client, server) = serve(vec![rejected], 1000);

        match client.go_to_position(&REQUEST) {
            Err(ArmMoverClientError::Rejected(msg)) => assert_eq!(msg, "busy"),
            r => panic!("Expected a rejection, got {:?}", r),
        }
        server.join().unwrap();
    }

    #[test]
    fn test_invalid_response() {
        let garbage = Reply {
            delay: Duration::from_millis(0),
            body: "not json".into(),
        };
        let (mut client, server) = serve(vec![garbage], 1000);

        assert!(matches!(
            client.go_to_position(&REQUEST),
            Err(ArmMoverClientError::DeserializeError(_))
        ));
        server.join().unwrap();
    }

    #[test]
    fn test_timeout_then_next_request() {
        let late = Reply {
            delay: Duration::from_millis(500),
            body: serde_json::to_string(&GoToPositionResponse::Moved {
                msg_feedback: "late".into(),
            })
            .unwrap(),
        };
        let (mut client, server) = serve(vec![late, moved("second")], 100);

        assert!(matches!(
            client.go_to_position(&REQUEST),
            Err(ArmMoverClientError::Timeout)
        ));

        // The late reply to the first request must not be taken as the answer to the second
        client.socket.set_rcvtimeo(5000).unwrap();
        assert_eq!(client.go_to_position(&REQUEST).unwrap(), "second");
        assert_eq!(server.join().unwrap().len(), 2);
    }

    #[test]
    fn test_send_error_mapping() {
        assert!(matches!(
            send_error(zmq::Error::EAGAIN),
            ArmMoverClientError::Timeout
        ));
        assert!(matches!(
            send_error(zmq::Error::ETERM),
            ArmMoverClientError::SendError(zmq::Error::ETERM)
        ));
    }
}
