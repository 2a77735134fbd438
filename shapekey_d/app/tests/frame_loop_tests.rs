//! Frame loop tests
//!
//! Drives `FrameLoop::handle` directly with a recording adapter.

use anyhow::{bail, Result};
use api::landmarks::{FACE_BOTTOM, FACE_LEFT, FACE_MESH_POINTS_WITH_IRIS, FACE_RIGHT, FACE_TOP};
use api::LandmarkSnapshot;
use common::{
    AppConfig, Axis, AxisMapping, FramePayload, GroupMappings, IntegrationAdapter, Readout,
    Session,
};
use glam::Vec3;
use shapekey_d::frame_loop::{FrameEvent, FrameLoop, FrameSlot};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::thread;
use std::time::{Duration, Instant};

const LIP_UPPER: usize = 13;
const LIP_LOWER: usize = 14;

#[derive(Clone, Default)]
struct Recorder {
    sent: Arc<Mutex<Vec<FramePayload>>>,
    fail: bool,
}

impl IntegrationAdapter for Recorder {
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn send(&self, payload: &FramePayload) -> Result<()> {
        if self.fail {
            bail!("connection refused");
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

fn mouth_frame(timestamp_ms: u64, opening: f32) -> FrameEvent {
    let mut points = vec![Vec3::new(0.5, 0.5, 0.0); FACE_MESH_POINTS_WITH_IRIS];
    points[FACE_LEFT] = Vec3::new(0.0, 0.5, 0.0);
    points[FACE_RIGHT] = Vec3::new(1.0, 0.5, 0.0);
    points[FACE_TOP] = Vec3::new(0.5, 0.0, 0.0);
    points[FACE_BOTTOM] = Vec3::new(0.5, 1.0, 0.0);
    points[LIP_UPPER] = Vec3::new(0.5, 0.4, 0.0);
    points[LIP_LOWER] = Vec3::new(0.5, 0.4 + opening, 0.0);
    FrameEvent::Face(LandmarkSnapshot::new(timestamp_ms, points))
}

fn jaw_session(send_enabled: bool) -> Arc<RwLock<Session>> {
    let mut config = AppConfig {
        send_enabled,
        ..Default::default()
    };
    config.groups.insert(
        "Jaw",
        GroupMappings {
            x: AxisMapping::two_point(LIP_UPPER, LIP_LOWER, 0.2, 0.4),
            y: AxisMapping::default(),
        },
    );
    Arc::new(RwLock::new(Session::new(config)))
}

fn setup(
    adapter: Recorder,
    send_enabled: bool,
) -> (FrameLoop<Recorder>, Arc<RwLock<Session>>, Arc<RwLock<Readout>>) {
    let session = jaw_session(send_enabled);
    let readout = Arc::new(RwLock::new(Readout::default()));
    let frame_loop = FrameLoop::new(adapter, session.clone(), readout.clone());
    (frame_loop, session, readout)
}

#[test]
fn face_frame_is_sent_and_published() {
    let recorder = Recorder::default();
    let (mut frame_loop, _session, readout) = setup(recorder.clone(), true);

    let payload = frame_loop.handle(mouth_frame(40, 0.3)).expect("payload");
    let jaw = payload.get("Jaw").unwrap();
    assert!((jaw.x - 0.5).abs() < 1e-5, "x = {}", jaw.x);

    let sent = recorder.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0], payload);

    let readout = readout.read().unwrap();
    assert!(readout.face_detected);
    assert_eq!(readout.timestamp_ms, 40);
    let selected = readout.selected.as_ref().expect("selected readout");
    assert_eq!(selected.group, "Jaw");
    assert!((selected.raw.x - 0.3).abs() < 1e-5);
    assert!(readout.points.contains(&LIP_UPPER));
}

#[test]
fn disabled_send_still_updates_readout() {
    let recorder = Recorder::default();
    let (mut frame_loop, _session, readout) = setup(recorder.clone(), false);

    assert!(frame_loop.handle(mouth_frame(1, 0.3)).is_some());
    assert!(recorder.sent.lock().unwrap().is_empty());
    assert_eq!(readout.read().unwrap().frame_count, 1);
}

#[test]
fn no_face_skips_processing() {
    let recorder = Recorder::default();
    let (mut frame_loop, _session, readout) = setup(recorder.clone(), true);

    frame_loop.handle(mouth_frame(1, 0.3));
    assert!(frame_loop
        .handle(FrameEvent::NoFace { timestamp_ms: 2 })
        .is_none());

    assert_eq!(recorder.sent.lock().unwrap().len(), 1);
    let readout = readout.read().unwrap();
    assert!(!readout.face_detected);
    assert!(readout.points.is_empty());
    assert_eq!(readout.frame_count, 1);
    // The last raw values stay available for calibration.
    assert_eq!(readout.last_raw("Jaw", Axis::X).map(|v| v > 0.0), Some(true));
}

#[test]
fn send_failure_does_not_stop_the_loop() {
    let recorder = Recorder {
        fail: true,
        ..Default::default()
    };
    let (mut frame_loop, _session, readout) = setup(recorder, true);

    assert!(frame_loop.handle(mouth_frame(1, 0.3)).is_some());
    assert!(frame_loop.handle(mouth_frame(2, 0.35)).is_some());
    assert_eq!(readout.read().unwrap().frame_count, 2);
}

#[test]
fn session_edits_apply_on_next_frame() {
    let recorder = Recorder::default();
    let (mut frame_loop, session, _readout) = setup(recorder.clone(), true);

    frame_loop.handle(mouth_frame(1, 0.3));
    assert_eq!(frame_loop.engine().tracked_groups(), 1);

    session.write().unwrap().remove_group("Jaw");
    let payload = frame_loop.handle(mouth_frame(2, 0.3)).expect("payload");
    assert!(payload.is_empty());
    assert_eq!(frame_loop.engine().tracked_groups(), 0);
    // Empty payloads are not transmitted.
    assert_eq!(recorder.sent.lock().unwrap().len(), 1);
}

#[test]
fn out_of_range_index_holds_previous_value() {
    let recorder = Recorder::default();
    let (mut frame_loop, session, _readout) = setup(recorder, true);

    let first = frame_loop.handle(mouth_frame(1, 0.3)).expect("payload");
    session
        .write()
        .unwrap()
        .set_axis("Jaw", Axis::X, AxisMapping::two_point(LIP_UPPER, 9999, 0.2, 0.4));
    let second = frame_loop.handle(mouth_frame(2, 0.35)).expect("payload");
    assert_eq!(second.get("Jaw"), first.get("Jaw"));
}

fn timestamp(event: &FrameEvent) -> u64 {
    match event {
        FrameEvent::Face(snapshot) => snapshot.timestamp_ms,
        FrameEvent::NoFace { timestamp_ms } => *timestamp_ms,
    }
}

#[test]
fn newest_frame_replaces_pending_one() {
    let slot = FrameSlot::new();
    assert!(slot.put(mouth_frame(1, 0.3)));
    assert!(slot.put(mouth_frame(2, 0.3)));
    assert!(slot.put(FrameEvent::NoFace { timestamp_ms: 3 }));

    let taken = slot.take_timeout(Duration::from_millis(10)).expect("pending frame");
    assert_eq!(timestamp(&taken), 3);
    assert!(slot.take_timeout(Duration::from_millis(10)).is_none());
}

#[test]
fn closed_slot_refuses_frames() {
    let slot = FrameSlot::new();
    slot.close();
    assert!(!slot.put(mouth_frame(1, 0.3)));

    let started = Instant::now();
    assert!(slot.take_timeout(Duration::from_secs(5)).is_none());
    assert!(started.elapsed() < Duration::from_secs(1));
}

#[test]
fn run_handles_frames_and_closes_slot_on_stop() {
    let recorder = Recorder::default();
    let (frame_loop, _session, readout) = setup(recorder.clone(), true);
    let slot = Arc::new(FrameSlot::new());
    let running = Arc::new(AtomicBool::new(true));

    let consumer = {
        let slot = slot.clone();
        let running = running.clone();
        thread::spawn(move || frame_loop.run(slot, running))
    };

    assert!(slot.put(mouth_frame(7, 0.3)));
    let deadline = Instant::now() + Duration::from_secs(5);
    while readout.read().unwrap().frame_count == 0 && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(readout.read().unwrap().timestamp_ms, 7);

    running.store(false, Ordering::SeqCst);
    consumer.join().unwrap();
    assert!(slot.is_closed());
    assert!(!slot.put(mouth_frame(8, 0.3)));
    assert_eq!(recorder.sent.lock().unwrap().len(), 1);
}
