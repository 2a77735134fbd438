use api::landmarks::{FACE_BOTTOM, FACE_LEFT, FACE_RIGHT, FACE_TOP};
use api::LandmarkSnapshot;
use glam::Vec3;

use crate::error::{point, ExtractError};
use crate::geometry::{distance, positive_or_one};

/// Face scale and face-local axes for one snapshot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceFrame {
    /// Ear-to-ear distance, never below or equal to zero.
    pub width: f32,
    /// Left ear to right ear, not normalized.
    pub x_axis: Vec3,
    /// Forehead to chin, not normalized.
    pub y_axis: Vec3,
}

impl FaceFrame {
    pub fn from_snapshot(snapshot: &LandmarkSnapshot) -> Result<Self, ExtractError> {
        let left = point(snapshot, FACE_LEFT)?;
        let right = point(snapshot, FACE_RIGHT)?;
        let top = point(snapshot, FACE_TOP)?;
        let bottom = point(snapshot, FACE_BOTTOM)?;

        Ok(Self {
            width: positive_or_one(distance(left, right)),
            x_axis: right - left,
            y_axis: bottom - top,
        })
    }

    /// Length of an axis vector, 1.0 when degenerate.
    pub fn axis_length(axis: Vec3) -> f32 {
        positive_or_one(axis.length())
    }
}
