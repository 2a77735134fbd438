use anyhow::Result;
use api::FramePayload;
use common::PeerMessage;
use log::{debug, error, warn};
use std::net::UdpSocket;

// Stand-in for the animation consumer: prints frames and answers group queries.
// Usage: shapekey_udp_rcv [port] [group...]
fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let port: u16 = args.first().and_then(|p| p.parse().ok()).unwrap_or(5000);
    let groups: Vec<String> = args.iter().skip(1).cloned().collect();

    let addr = format!("0.0.0.0:{}", port);
    let socket = UdpSocket::bind(&addr)?;

    println!("Listening for shape key frames on {}...", addr);
    if !groups.is_empty() {
        println!("Advertising groups: {}", groups.join(", "));
    }

    let mut buf = [0u8; 65535]; // Max UDP size
    let mut last_data: Option<FramePayload> = None;

    loop {
        match socket.recv_from(&mut buf) {
            Ok((amt, src)) => {
                let slice = &buf[..amt];

                if let Ok(PeerMessage::GetGroups) = PeerMessage::decode(slice) {
                    debug!("Group query from {}", src);
                    let reply = PeerMessage::Groups {
                        groups: groups.clone(),
                    };
                    if let Err(e) = socket.send_to(&reply.encode()?, src) {
                        error!("Failed to answer group query from {}: {}", src, e);
                    }
                    continue;
                }

                match serde_json::from_slice::<FramePayload>(slice) {
                    Ok(data) => {
                        if last_data.as_ref() != Some(&data) {
                            println!("Received frame from {}:", src);
                            for (name, pair) in &data.groups {
                                println!("  {:<16} x={:+.3} y={:+.3}", name, pair.x, pair.y);
                            }
                            last_data = Some(data);
                        }
                    }
                    Err(e) => {
                        warn!("Failed to deserialize packet from {}: {}", src, e);
                        if let Ok(s) = std::str::from_utf8(slice) {
                            debug!("Raw data: {}", s);
                        }
                    }
                }
            }
            Err(e) => {
                error!("Error receiving data: {}", e);
            }
        }
    }
}
