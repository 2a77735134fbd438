use api::AxisPair;
use common::{FramePayload, IntegrationAdapter};
use shapekey_d::strategies::generic_udp::{GenericUdpStrategy, MAX_RECORD_BYTES};
use std::net::UdpSocket;
use std::time::Duration;

#[test]
fn frame_arrives_as_one_json_datagram() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(Duration::from_secs(2)))
        .unwrap();

    let mut output = GenericUdpStrategy::new(receiver.local_addr().unwrap().to_string());
    output.initialize().unwrap();

    let mut payload = FramePayload::default();
    payload.insert("Jaw", AxisPair { x: 0.5, y: 0.0 });
    output.send(&payload).unwrap();

    let mut buf = [0u8; 2048];
    let len = receiver.recv(&mut buf).unwrap();
    let received: FramePayload = serde_json::from_slice(&buf[..len]).unwrap();
    assert_eq!(received, payload);
}

#[test]
fn send_before_initialize_is_a_no_op() {
    let output = GenericUdpStrategy::new("127.0.0.1:9".to_string());
    let mut payload = FramePayload::default();
    payload.insert("Jaw", AxisPair::default());
    assert!(output.send(&payload).is_ok());
}

#[test]
fn oversized_frame_is_rejected() {
    let mut payload = FramePayload::default();
    for i in 0..3000 {
        payload.insert(format!("Group{:05}", i), AxisPair { x: 0.123, y: -0.456 });
    }
    let err = GenericUdpStrategy::encode(&payload).unwrap_err();
    assert!(err.to_string().contains("3000 group(s)"));

    let mut small = FramePayload::default();
    small.insert("Jaw", AxisPair::default());
    assert!(GenericUdpStrategy::encode(&small).unwrap().len() < MAX_RECORD_BYTES);
}
