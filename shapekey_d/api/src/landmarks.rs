//! Landmark indices of the 478-point face mesh that the engine relies on.

/// Face mesh points without the iris refinement.
pub const FACE_MESH_POINTS: usize = 468;
/// Face mesh points including the ten iris points.
pub const FACE_MESH_POINTS_WITH_IRIS: usize = 478;

/// Cheek/ear point on the left side of the image.
pub const FACE_LEFT: usize = 234;
/// Cheek/ear point on the right side of the image.
pub const FACE_RIGHT: usize = 454;
/// Forehead top.
pub const FACE_TOP: usize = 10;
/// Chin bottom.
pub const FACE_BOTTOM: usize = 152;

/// Points describing one eye for iris tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EyeLandmarks {
    pub iris: usize,
    pub inner: usize,
    pub outer: usize,
    pub top: usize,
    pub bottom: usize,
}

impl EyeLandmarks {
    pub const fn all(&self) -> [usize; 5] {
        [self.iris, self.inner, self.outer, self.top, self.bottom]
    }

    pub fn contains(&self, index: usize) -> bool {
        self.all().contains(&index)
    }
}

/// Right eye as seen in the mirrored camera image.
pub const EYE_RIGHT: EyeLandmarks = EyeLandmarks {
    iris: 468,
    inner: 133,
    outer: 33,
    top: 159,
    bottom: 145,
};

pub const EYE_LEFT: EyeLandmarks = EyeLandmarks {
    iris: 473,
    inner: 362,
    outer: 263,
    top: 386,
    bottom: 374,
};
