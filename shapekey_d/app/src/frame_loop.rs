use api::LandmarkSnapshot;
use common::{AxisEngine, FramePayload, IntegrationAdapter, Readout, Session};
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::shared::{read_lock, write_lock};

/// What the producer thread hands the frame loop.
#[derive(Debug, Clone)]
pub enum FrameEvent {
    Face(LandmarkSnapshot),
    NoFace { timestamp_ms: u64 },
}

/// Single-frame handoff between producer and consumer.
///
/// A new frame replaces one the consumer has not taken yet, so the
/// consumer never works through a backlog.
#[derive(Default)]
pub struct FrameSlot {
    pending: Mutex<Option<FrameEvent>>,
    ready: Condvar,
    closed: AtomicBool,
}

impl FrameSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `event`, dropping any frame still pending. Returns `false`
    /// once the slot is closed.
    pub fn put(&self, event: FrameEvent) -> bool {
        if self.is_closed() {
            return false;
        }
        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(event);
        self.ready.notify_one();
        true
    }

    /// Waits up to `timeout` for a frame.
    pub fn take_timeout(&self, timeout: Duration) -> Option<FrameEvent> {
        let pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        let (mut pending, _) = self
            .ready
            .wait_timeout_while(pending, timeout, |p| p.is_none() && !self.is_closed())
            .unwrap_or_else(PoisonError::into_inner);
        pending.take()
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.ready.notify_all();
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

/// Consumer side of the pipeline: owns the engine and the transport.
pub struct FrameLoop<A: IntegrationAdapter> {
    engine: AxisEngine,
    adapter: A,
    session: Arc<RwLock<Session>>,
    readout: Arc<RwLock<Readout>>,
    frame_count: u64,
    log_interval: u64,
    last_log: Instant,
    last_send_warn: Option<Instant>,
}

impl<A: IntegrationAdapter> FrameLoop<A> {
    pub fn new(adapter: A, session: Arc<RwLock<Session>>, readout: Arc<RwLock<Readout>>) -> Self {
        Self {
            engine: AxisEngine::default(),
            adapter,
            session,
            readout,
            frame_count: 0,
            log_interval: 1000,
            last_log: Instant::now(),
            last_send_warn: None,
        }
    }

    pub fn engine(&self) -> &AxisEngine {
        &self.engine
    }

    /// Processes one event and returns the payload that was produced, if any.
    pub fn handle(&mut self, event: FrameEvent) -> Option<FramePayload> {
        let snapshot = match event {
            FrameEvent::Face(snapshot) => snapshot,
            FrameEvent::NoFace { timestamp_ms } => {
                write_lock(&self.readout).record_no_face(timestamp_ms);
                return None;
            }
        };

        let settings = read_lock(&self.session).frame_settings();
        if settings.blink_ratio != self.engine.iris().blink_ratio() {
            self.engine.iris_mut().set_blink_ratio(settings.blink_ratio);
        }

        let output = match self.engine.process(&snapshot, &settings.groups) {
            Ok(output) => output,
            Err(e) => {
                debug!("Skipping frame at {} ms: {}", snapshot.timestamp_ms, e);
                return None;
            }
        };

        #[cfg(feature = "xtralog")]
        log::trace!(
            "Frame {} ms: {} group(s), points {:?}",
            snapshot.timestamp_ms,
            output.payload.len(),
            output.points
        );

        write_lock(&self.readout).record_frame(
            &output,
            settings.selected.as_deref(),
            snapshot.timestamp_ms,
        );

        if settings.send_enabled && !output.payload.is_empty() {
            if let Err(e) = self.adapter.send(&output.payload) {
                self.warn_send_failure(&e);
            }
        }

        self.count_frame();
        Some(output.payload)
    }

    /// Handles frames until `running` is cleared or the slot is closed.
    /// The slot is closed on return so the producer stops handing over frames.
    pub fn run(mut self, slot: Arc<FrameSlot>, running: Arc<AtomicBool>) {
        info!("Frame loop started");

        while running.load(Ordering::SeqCst) && !slot.is_closed() {
            if let Some(event) = slot.take_timeout(Duration::from_millis(100)) {
                self.handle(event);
            }
        }

        slot.close();
        info!("Frame loop stopped after {} frames", self.frame_count);
    }

    fn warn_send_failure(&mut self, e: &anyhow::Error) {
        let now = Instant::now();
        let should_log = match self.last_send_warn {
            Some(last) => now.duration_since(last).as_secs() >= 5,
            None => true,
        };
        if should_log {
            warn!("Failed to send frame: {}", e);
            self.last_send_warn = Some(now);
        }
    }

    fn count_frame(&mut self) {
        self.frame_count += 1;
        if self.frame_count % self.log_interval != 0 {
            return;
        }

        let elapsed = self.last_log.elapsed().as_secs_f32();
        let fps = self.log_interval as f32 / elapsed;
        info!(
            "Tracking Active: Processed {} frames (approx {:.1} FPS)",
            self.frame_count, fps
        );
        self.last_log = Instant::now();

        if self.frame_count >= 1_000_000 {
            self.log_interval = 1_000_000;
        } else if self.frame_count >= 100_000 {
            self.log_interval = 100_000;
        } else if self.frame_count >= 10_000 {
            self.log_interval = 10_000;
        }
    }
}
