use api::{EyeLandmarks, LandmarkSnapshot, EYE_LEFT, EYE_RIGHT};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::error::{point, ExtractError};
use crate::geometry::positive_or_one;

/// EMA rate for the iris offset.
pub const IRIS_EMA_ALPHA: f32 = 0.30;
/// Eye height below this fraction of eye width counts as a blink.
pub const DEFAULT_BLINK_RATIO: f32 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EyeSide {
    Left,
    Right,
}

impl EyeSide {
    pub fn landmarks(&self) -> EyeLandmarks {
        match self {
            EyeSide::Left => EYE_LEFT,
            EyeSide::Right => EYE_RIGHT,
        }
    }

    /// Picks the eye whose landmark set contains `point_b`; anything else is
    /// treated as the right eye.
    pub fn resolve(point_b: usize) -> Self {
        if EYE_LEFT.contains(point_b) {
            EyeSide::Left
        } else {
            EyeSide::Right
        }
    }

    fn index(&self) -> usize {
        match self {
            EyeSide::Left => 0,
            EyeSide::Right => 1,
        }
    }
}

/// Eye geometry for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EyeMeasurement {
    pub width: f32,
    pub height: f32,
    /// Iris offset from the eye centre in eye widths.
    pub offset: Vec2,
}

impl EyeMeasurement {
    pub fn measure(snapshot: &LandmarkSnapshot, eye: &EyeLandmarks) -> Result<Self, ExtractError> {
        let iris = point(snapshot, eye.iris)?;
        let inner = point(snapshot, eye.inner)?;
        let outer = point(snapshot, eye.outer)?;
        let top = point(snapshot, eye.top)?;
        let bottom = point(snapshot, eye.bottom)?;

        // Eye-local X runs from the outer corner to the inner corner.
        let ex = inner - outer;
        let width = positive_or_one(ex.length());
        let height = (top.y - bottom.y).abs();

        let center = glam::Vec3::new(
            (inner.x + outer.x) / 2.0,
            (top.y + bottom.y) / 2.0,
            (inner.z + outer.z) / 2.0,
        );
        let delta = iris - center;
        let offset = Vec2::new(delta.dot(ex) / (width * width), delta.y / width);

        if !offset.is_finite() || !height.is_finite() {
            return Err(ExtractError::NonFinite("eye landmarks"));
        }

        Ok(Self {
            width,
            height,
            offset,
        })
    }

    pub fn is_blinking(&self, blink_ratio: f32) -> bool {
        self.height < blink_ratio * self.width
    }

    pub fn offset(&self, axis: Axis) -> f32 {
        match axis {
            Axis::X => self.offset.x,
            Axis::Y => self.offset.y,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct EyeState {
    ema: Vec2,
    updated: [bool; 2],
}

/// Blink-robust running average of the iris offset, per eye and axis.
///
/// Each eye/axis average advances at most once per frame no matter how many
/// groups read it.
#[derive(Debug, Clone)]
pub struct IrisTracker {
    alpha: f32,
    blink_ratio: f32,
    eyes: [EyeState; 2],
}

impl Default for IrisTracker {
    fn default() -> Self {
        Self::new(DEFAULT_BLINK_RATIO)
    }
}

impl IrisTracker {
    pub fn new(blink_ratio: f32) -> Self {
        Self {
            alpha: IRIS_EMA_ALPHA,
            blink_ratio,
            eyes: [EyeState::default(); 2],
        }
    }

    pub fn set_blink_ratio(&mut self, blink_ratio: f32) {
        self.blink_ratio = blink_ratio;
    }

    pub fn blink_ratio(&self) -> f32 {
        self.blink_ratio
    }

    /// Allows every eye/axis average to advance once more.
    pub fn begin_frame(&mut self) {
        for eye in &mut self.eyes {
            eye.updated = [false; 2];
        }
    }

    /// Current average for `side`/`axis`, advancing it first if it has not
    /// been advanced this frame. While the eye is blinking the previous value
    /// is returned unchanged.
    pub fn sample(
        &mut self,
        snapshot: &LandmarkSnapshot,
        side: EyeSide,
        axis: Axis,
    ) -> Result<f32, ExtractError> {
        let slot = axis_index(axis);
        let state = &mut self.eyes[side.index()];

        if !state.updated[slot] {
            let measurement = EyeMeasurement::measure(snapshot, &side.landmarks())?;
            state.updated[slot] = true;

            if !measurement.is_blinking(self.blink_ratio) {
                let current = state.ema[slot];
                state.ema[slot] = current + self.alpha * (measurement.offset(axis) - current);
            }
        }

        Ok(state.ema[slot])
    }

    pub fn ema(&self, side: EyeSide, axis: Axis) -> f32 {
        self.eyes[side.index()].ema[axis_index(axis)]
    }

    pub fn reset(&mut self) {
        self.eyes = [EyeState::default(); 2];
    }
}

fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
    }
}
