//! Simple arm mover service for bench testing the look-away watchdog.
//!
//! Accepts `GoToPosition` requests on port 5012 and acknowledges them without moving anything.
//! Every fifth request is rejected so that failure reporting can be observed.

use comms_if::{
    eqpt::arm::{GoToPosition, GoToPositionResponse},
    net::{MonitoredSocket, SocketOptions},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = zmq::Context::new();

    let socket_options = SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    let socket = MonitoredSocket::new(&ctx, zmq::REP, socket_options, "tcp://*:5012")?;

    println!("Arm mover running on port 5012");

    let mut num_requests = 0u64;

    loop {
        let msg = socket.recv_msg(0)?;

        let response = match msg.as_str().map(serde_json::from_str::<GoToPosition>) {
            Some(Ok(req)) => {
                num_requests += 1;
                println!("Request {}: {:?}", num_requests, req);

                if num_requests % 5 == 0 {
                    GoToPositionResponse::Rejected {
                        msg_feedback: "Simulated rejection".into(),
                    }
                } else {
                    GoToPositionResponse::Moved {
                        msg_feedback: format!(
                            "Joint angles set to: {}, {}",
                            req.joint_1, req.joint_2
                        ),
                    }
                }
            }
            Some(Err(e)) => GoToPositionResponse::Rejected {
                msg_feedback: format!("Invalid request: {}", e),
            },
            None => GoToPositionResponse::Rejected {
                msg_feedback: "Request was not valid UTF-8".into(),
            },
        };

        socket.send(serde_json::to_string(&response)?.as_str(), 0)?;
    }
}
