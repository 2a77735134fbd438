use glam::Vec3;

/// Euclidean distance between two landmarks.
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    a.distance(b)
}

/// Piecewise-linear map of `value` from `[radius_min, radius_max]` onto
/// `[out_min, out_max]`, clamped at both ends.
///
/// A degenerate range (`radius_max <= radius_min`) always yields `out_min`.
pub fn normalize_value(value: f32, radius_min: f32, radius_max: f32, out_min: f32, out_max: f32) -> f32 {
    if radius_max <= radius_min {
        return out_min;
    }
    if value <= radius_min {
        return out_min;
    }
    if value >= radius_max {
        return out_max;
    }
    let normalized = (value - radius_min) / (radius_max - radius_min);
    out_min + (out_max - out_min) * normalized
}

/// `sign(value) * |value|^power`.
pub fn signed_pow(value: f32, power: f32) -> f32 {
    if value == 0.0 {
        return 0.0;
    }
    value.abs().powf(power).copysign(value)
}

/// Returns `value` unless it is not strictly positive, in which case 1.0.
pub(crate) fn positive_or_one(value: f32) -> f32 {
    if value > 0.0 {
        value
    } else {
        1.0
    }
}
