use serde::{Deserialize, Serialize};

use crate::axis::Axis;
use crate::group::GroupTable;
use crate::readout::Readout;

/// Which radius bound a calibration writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RadiusBound {
    Min,
    Max,
}

/// Stores the selected group's last raw value of `axis` as its radius bound.
///
/// Signed modes normalize `|raw|`, so the magnitude is what gets stored. A
/// zero raw value, a missing selection or a group that has not produced a
/// value yet leaves the table untouched and returns `None`.
pub fn calibrate(
    table: &mut GroupTable,
    selected: Option<&str>,
    readout: &Readout,
    axis: Axis,
    bound: RadiusBound,
) -> Option<f32> {
    let group = selected?;
    let raw = readout.last_raw(group, axis)?.abs();
    if raw == 0.0 || !raw.is_finite() {
        return None;
    }

    // Four decimals, as shown in the raw readout.
    let value = (raw * 10_000.0).round() / 10_000.0;
    let mapping = table.get_mut(group)?.axis_mut(axis);
    match bound {
        RadiusBound::Min => mapping.radius_min = value,
        RadiusBound::Max => mapping.radius_max = value,
    }
    Some(value)
}
