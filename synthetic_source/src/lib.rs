// Landmark source that animates a generated face mesh. Useful for exercising
// the daemon without a camera.

use anyhow::Result;
use api::landmarks::{
    EyeLandmarks, FACE_BOTTOM, FACE_LEFT, FACE_MESH_POINTS_WITH_IRIS, FACE_RIGHT, FACE_TOP,
};
use api::{
    Detection, LandmarkSnapshot, LandmarkSource, ModuleLogger, SourceSettings, EYE_LEFT, EYE_RIGHT,
};
use glam::{Vec2, Vec3};
use std::time::{Duration, Instant};

const FRAME_INTERVAL: Duration = Duration::from_millis(33);
const BLINK_PERIOD_MS: u64 = 4000;
const BLINK_LENGTH_MS: u64 = 150;
const UPPER_LIP: usize = 13;
const LOWER_LIP: usize = 14;

const EYE_HALF_WIDTH: f32 = 0.045;
const EYE_OPEN_HALF_HEIGHT: f32 = 0.015;

pub struct SyntheticSource {
    started: Instant,
    last_frame: Option<Instant>,
    frame_count: u64,
    logger: Option<ModuleLogger>,
}

impl SyntheticSource {
    fn new() -> Self {
        Self {
            started: Instant::now(),
            last_frame: None,
            frame_count: 0,
            logger: None,
        }
    }
}

/// Builds the mesh for time `t_ms`.
///
/// Points the daemon never looks at sit on an ellipse around the face so the
/// snapshot is fully populated.
pub fn face_at(t_ms: u64) -> Vec<Vec3> {
    let t = t_ms as f32 / 1000.0;
    let centre = Vec2::new(0.5, 0.5);

    let mut points: Vec<Vec3> = (0..FACE_MESH_POINTS_WITH_IRIS)
        .map(|i| {
            let angle = i as f32 / FACE_MESH_POINTS_WITH_IRIS as f32 * std::f32::consts::TAU;
            Vec3::new(
                centre.x + 0.18 * angle.cos(),
                centre.y + 0.24 * angle.sin(),
                0.0,
            )
        })
        .collect();

    points[FACE_LEFT] = Vec3::new(0.3, 0.5, 0.0);
    points[FACE_RIGHT] = Vec3::new(0.7, 0.5, 0.0);
    points[FACE_TOP] = Vec3::new(0.5, 0.25, 0.0);
    points[FACE_BOTTOM] = Vec3::new(0.5, 0.8, 0.0);

    let jaw_open = 0.02 + 0.03 * (0.5 + 0.5 * (t * 0.8).sin());
    points[UPPER_LIP] = Vec3::new(0.5, 0.66, 0.0);
    points[LOWER_LIP] = Vec3::new(0.5, 0.66 + jaw_open, 0.0);

    let gaze = Vec2::new((t * 0.6).sin() * 0.6, (t * 0.35).cos() * 0.4);
    let blinking = t_ms % BLINK_PERIOD_MS < BLINK_LENGTH_MS;
    let openness = if blinking { 0.1 } else { 1.0 };

    // Image-left eye is EYE_RIGHT; its outer corner faces the image edge.
    place_eye(&mut points, &EYE_RIGHT, Vec2::new(0.42, 0.42), -1.0, gaze, openness);
    place_eye(&mut points, &EYE_LEFT, Vec2::new(0.58, 0.42), 1.0, gaze, openness);

    points
}

fn place_eye(
    points: &mut [Vec3],
    eye: &EyeLandmarks,
    centre: Vec2,
    outward: f32,
    gaze: Vec2,
    openness: f32,
) {
    let half_height = EYE_OPEN_HALF_HEIGHT * openness;
    let at = |offset: Vec2| (centre + offset).extend(0.0);

    points[eye.outer] = at(Vec2::new(outward * EYE_HALF_WIDTH, 0.0));
    points[eye.inner] = at(Vec2::new(-outward * EYE_HALF_WIDTH, 0.0));
    points[eye.top] = at(Vec2::new(0.0, -half_height));
    points[eye.bottom] = at(Vec2::new(0.0, half_height));
    points[eye.iris] = at(Vec2::new(
        gaze.x * EYE_HALF_WIDTH * 0.5,
        gaze.y * EYE_OPEN_HALF_HEIGHT * 0.5,
    ));
}

impl LandmarkSource for SyntheticSource {
    fn initialize(&mut self, logger: ModuleLogger, settings: &SourceSettings) -> Result<()> {
        logger.info(&format!(
            "Synthetic source ready (camera index {} ignored)",
            settings.camera_index
        ));
        self.started = Instant::now();
        self.logger = Some(logger);
        Ok(())
    }

    fn update(&mut self, snapshot: &mut LandmarkSnapshot) -> Result<Detection> {
        let now = Instant::now();
        if self
            .last_frame
            .is_some_and(|last| now.duration_since(last) < FRAME_INTERVAL)
        {
            return Ok(Detection::Pending);
        }
        self.last_frame = Some(now);
        self.frame_count += 1;

        let t_ms = now.duration_since(self.started).as_millis() as u64;
        snapshot.timestamp_ms = t_ms;
        snapshot.points = face_at(t_ms);

        if self.frame_count == 1 {
            if let Some(logger) = &self.logger {
                logger.debug(&format!("First frame with {} points", snapshot.len()));
            }
        }
        Ok(Detection::Face)
    }

    fn unload(&mut self) {
        if let Some(logger) = &self.logger {
            logger.info(&format!(
                "Synthetic source stopped after {} frames",
                self.frame_count
            ));
        }
    }
}

#[no_mangle]
#[allow(improper_ctypes_definitions)]
pub extern "C" fn create_source() -> *mut dyn LandmarkSource {
    Box::into_raw(Box::new(SyntheticSource::new()))
}
