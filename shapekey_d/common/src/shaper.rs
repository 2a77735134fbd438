use crate::axis::{AxisMapping, AxisMode};
use crate::geometry::normalize_value;

/// Maps a raw axis value to the `[-1, 1]` output range.
///
/// Signed modes normalize the magnitude and restore the sign afterwards.
/// The result is always clamped, whatever the mapping says.
pub fn shape(mapping: &AxisMapping, raw: f32) -> f32 {
    let normalized = match mapping.mode {
        AxisMode::None => return 0.0,
        AxisMode::TwoPoint => normalize(mapping, raw),
        AxisMode::OnePointProjection | AxisMode::Iris => {
            let magnitude = normalize(mapping, raw.abs());
            if raw < 0.0 {
                -magnitude
            } else {
                magnitude
            }
        }
    };

    let value = normalized * mapping.effective_sens();
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(-1.0, 1.0)
}

fn normalize(mapping: &AxisMapping, value: f32) -> f32 {
    normalize_value(
        value,
        mapping.radius_min,
        mapping.radius_max,
        mapping.out_min,
        mapping.out_max,
    )
}
