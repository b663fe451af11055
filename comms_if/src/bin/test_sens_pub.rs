//! Simple sensor publisher for bench testing the look-away watchdog.
//!
//! Publishes joint states on port 5010 and 4x4 mono frames on port 5011. The arm alternates
//! between sweeping (moving) and resting every ten samples, and every third frame contains a
//! bright pixel so that both uniform and non-uniform frames are seen.

use comms_if::{
    eqpt::{arm::JointStateMsg, cam::ImageMsg},
    net::{MonitoredSocket, SocketOptions},
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let ctx = zmq::Context::new();

    let socket_options = || SocketOptions {
        bind: true,
        block_on_first_connect: false,
        ..Default::default()
    };

    let joints_socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options(), "tcp://*:5010")?;
    let frames_socket = MonitoredSocket::new(&ctx, zmq::PUB, socket_options(), "tcp://*:5011")?;

    println!("Publishing joint states on port 5010 and frames on port 5011");

    let mut pos = [0.0f64; 2];
    let mut cycle = 0u64;

    loop {
        // Sweep for ten cycles, rest for ten
        if (cycle / 10) % 2 == 0 {
            pos[0] += 0.01;
            pos[1] -= 0.01;
        }

        let js = JointStateMsg::from_positions(pos.to_vec());
        if let Err(e) = joints_socket.send(serde_json::to_string(&js)?.as_str(), 0) {
            println!("Failed to send joint state: {}", e);
        }

        let mut data = vec![20u8; 16];
        if cycle % 3 == 0 {
            data[5] = 255;
        }
        let img = ImageMsg::from_raw(4, 4, "mono8", 4, &data);
        if let Err(e) = frames_socket.send(serde_json::to_string(&img)?.as_str(), 0) {
            println!("Failed to send frame: {}", e);
        }

        cycle += 1;
        std::thread::sleep(std::time::Duration::from_millis(200));
    }
}
