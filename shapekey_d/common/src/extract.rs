use api::LandmarkSnapshot;

use crate::axis::{Axis, AxisMapping, AxisMode};
use crate::error::{point, ExtractError};
use crate::face_frame::FaceFrame;
use crate::geometry::{distance, signed_pow};
use crate::iris::{EyeSide, IrisTracker};

/// Brings typical 1-point projections near unit scale.
pub const PROJECTION_GAIN: f32 = 10.0;

/// Raw, unshaped axis value and the landmarks it was computed from.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawSample {
    pub value: f32,
    pub points: Vec<usize>,
}

/// Computes the raw value of `axis` under `mapping` for the current frame.
pub fn extract_axis(
    mapping: &AxisMapping,
    axis: Axis,
    snapshot: &LandmarkSnapshot,
    face: &FaceFrame,
    iris: &mut IrisTracker,
) -> Result<RawSample, ExtractError> {
    let sample = match mapping.mode {
        AxisMode::None => RawSample::default(),
        AxisMode::TwoPoint => {
            let (a, b) = required_points(mapping)?;
            let dist = distance(point(snapshot, a)?, point(snapshot, b)?);
            RawSample {
                value: dist / face.width,
                points: vec![a, b],
            }
        }
        AxisMode::OnePointProjection => {
            let (a, b) = required_points(mapping)?;
            let target = point(snapshot, a)? - point(snapshot, b)?;
            let face_axis = match axis {
                Axis::X => face.x_axis,
                Axis::Y => face.y_axis,
            };
            let projected = target.dot(face_axis) / FaceFrame::axis_length(face_axis) / face.width;
            RawSample {
                value: projected * PROJECTION_GAIN,
                points: vec![a, b],
            }
        }
        AxisMode::Iris => {
            let point_b = mapping.point_b.ok_or(ExtractError::MissingPoint("point_b"))?;
            let side = EyeSide::resolve(point_b);
            let ema = iris.sample(snapshot, side, axis)?;
            RawSample {
                value: signed_pow(ema, mapping.exp_power),
                points: side.landmarks().all().to_vec(),
            }
        }
    };

    if !sample.value.is_finite() {
        return Err(ExtractError::NonFinite("raw value"));
    }
    Ok(sample)
}

fn required_points(mapping: &AxisMapping) -> Result<(usize, usize), ExtractError> {
    let a = mapping.point_a.ok_or(ExtractError::MissingPoint("point_a"))?;
    let b = mapping.point_b.ok_or(ExtractError::MissingPoint("point_b"))?;
    Ok((a, b))
}
