#![allow(dead_code)]

use api::landmarks::{FACE_BOTTOM, FACE_LEFT, FACE_MESH_POINTS_WITH_IRIS, FACE_RIGHT, FACE_TOP};
use api::{EyeLandmarks, LandmarkSnapshot};
use glam::{Vec2, Vec3};

pub const EPS: f32 = 1e-5;

/// A face one unit wide with axis-aligned face axes and every other point
/// at the image centre.
pub fn unit_face() -> LandmarkSnapshot {
    let mut points = vec![Vec3::new(0.5, 0.5, 0.0); FACE_MESH_POINTS_WITH_IRIS];
    points[FACE_LEFT] = Vec3::new(0.0, 0.5, 0.0);
    points[FACE_RIGHT] = Vec3::new(1.0, 0.5, 0.0);
    points[FACE_TOP] = Vec3::new(0.5, 0.0, 0.0);
    points[FACE_BOTTOM] = Vec3::new(0.5, 1.0, 0.0);
    LandmarkSnapshot::new(0, points)
}

/// Places an eye 0.1 wide with its outer corner at `origin`. The iris sits
/// `offset` eye widths from the eye centre. A closed eye has its lids
/// 0.01 apart, an open one 0.06.
pub fn place_eye(snapshot: &mut LandmarkSnapshot, eye: &EyeLandmarks, origin: Vec2, offset: Vec2, open: bool) {
    let width = 0.1;
    let lid = if open { 0.03 } else { 0.005 };
    let outer = Vec3::new(origin.x, origin.y, 0.0);
    let inner = Vec3::new(origin.x + width, origin.y, 0.0);
    let center = (outer + inner) / 2.0;

    snapshot.points[eye.outer] = outer;
    snapshot.points[eye.inner] = inner;
    snapshot.points[eye.top] = center - Vec3::new(0.0, lid, 0.0);
    snapshot.points[eye.bottom] = center + Vec3::new(0.0, lid, 0.0);
    snapshot.points[eye.iris] = center + Vec3::new(offset.x * width, offset.y * width, 0.0);
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPS
}
