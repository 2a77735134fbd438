use log::warn;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::iris::EyeSide;

pub const DEFAULT_EXP_POWER: f32 = 1.2;
pub const DEFAULT_LERP_FACTOR: f32 = 0.15;

/// Which output component of a group a mapping drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Axis {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            other => Err(anyhow::anyhow!("unknown axis '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AxisMode {
    #[default]
    #[serde(rename = "none")]
    None,
    /// Distance between two points relative to face width.
    #[serde(rename = "2pt", alias = "box")]
    TwoPoint,
    /// Offset of `point_a` from `point_b` along a face-local axis.
    #[serde(rename = "1pt")]
    OnePointProjection,
    /// Smoothed iris offset inside the eye selected by `point_b`.
    #[serde(rename = "iris")]
    Iris,
}

impl AxisMode {
    /// Modes whose raw value carries a direction.
    pub fn is_signed(&self) -> bool {
        matches!(self, AxisMode::OnePointProjection | AxisMode::Iris)
    }
}

/// Configuration for one axis of one group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "AxisMappingRepr")]
pub struct AxisMapping {
    pub mode: AxisMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_a: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point_b: Option<usize>,
    pub radius_min: f32,
    pub radius_max: f32,
    pub out_min: f32,
    pub out_max: f32,
    pub sens: f32,
    pub exp_power: f32,
    pub lerp_enabled: bool,
    pub lerp_factor: f32,
}

impl Default for AxisMapping {
    fn default() -> Self {
        Self {
            mode: AxisMode::None,
            point_a: None,
            point_b: None,
            radius_min: 0.0,
            radius_max: 1.0,
            out_min: 0.0,
            out_max: 1.0,
            sens: 1.0,
            exp_power: DEFAULT_EXP_POWER,
            lerp_enabled: false,
            lerp_factor: DEFAULT_LERP_FACTOR,
        }
    }
}

impl AxisMapping {
    pub fn two_point(point_a: usize, point_b: usize, radius_min: f32, radius_max: f32) -> Self {
        Self {
            mode: AxisMode::TwoPoint,
            point_a: Some(point_a),
            point_b: Some(point_b),
            radius_min,
            radius_max,
            ..Default::default()
        }
    }

    pub fn one_point(point_a: usize, point_b: usize, radius_min: f32, radius_max: f32) -> Self {
        Self {
            mode: AxisMode::OnePointProjection,
            point_a: Some(point_a),
            point_b: Some(point_b),
            radius_min,
            radius_max,
            ..Default::default()
        }
    }

    /// Ready-to-use iris mapping for a ±1 gaze range.
    ///
    /// A small dead zone (0.02) keeps a centred gaze stable at zero.
    pub fn iris_preset(eye: EyeSide, axis: Axis) -> Self {
        let landmarks = eye.landmarks();
        let point_b = match axis {
            Axis::X => landmarks.outer,
            Axis::Y => landmarks.top,
        };
        Self {
            mode: AxisMode::Iris,
            point_a: Some(landmarks.iris),
            point_b: Some(point_b),
            radius_min: 0.02,
            radius_max: 0.30,
            out_min: 0.0,
            out_max: 1.0,
            sens: 1.0,
            ..Default::default()
        }
    }

    /// Output gain; zero is not a usable gain and falls back to 1.0.
    pub fn effective_sens(&self) -> f32 {
        if self.sens == 0.0 || !self.sens.is_finite() {
            1.0
        } else {
            self.sens
        }
    }

    /// Lerp factor restricted to `(0, 1]`.
    pub fn effective_lerp_factor(&self) -> f32 {
        if self.lerp_factor > 0.0 {
            self.lerp_factor.min(1.0)
        } else {
            DEFAULT_LERP_FACTOR
        }
    }

    pub fn is_active(&self) -> bool {
        self.mode != AxisMode::None
    }
}

/// On-disk shape of an [`AxisMapping`], accepting older key names.
#[derive(Deserialize)]
struct AxisMappingRepr {
    #[serde(default)]
    mode: Option<AxisMode>,
    #[serde(default)]
    point_a: Option<usize>,
    #[serde(default)]
    point_b: Option<usize>,
    #[serde(default, alias = "min")]
    radius_min: Option<f32>,
    #[serde(default, alias = "max")]
    radius_max: Option<f32>,
    #[serde(default)]
    out_min: Option<f32>,
    #[serde(default)]
    out_max: Option<f32>,
    #[serde(default)]
    sens: Option<f32>,
    #[serde(default)]
    exp_power: Option<f32>,
    #[serde(default, alias = "lerp_en")]
    lerp_enabled: Option<bool>,
    #[serde(default, alias = "lerp_fac")]
    lerp_factor: Option<f32>,
}

impl From<AxisMappingRepr> for AxisMapping {
    fn from(repr: AxisMappingRepr) -> Self {
        let defaults = AxisMapping::default();
        // Older files have no mode key; a mapping with both points was a 2pt mapping.
        let mode = repr.mode.unwrap_or(match (repr.point_a, repr.point_b) {
            (Some(_), Some(_)) => AxisMode::TwoPoint,
            _ => AxisMode::None,
        });

        Self {
            mode,
            point_a: repr.point_a,
            point_b: repr.point_b,
            radius_min: repr.radius_min.unwrap_or(defaults.radius_min),
            radius_max: repr.radius_max.unwrap_or(defaults.radius_max),
            out_min: repr.out_min.unwrap_or(defaults.out_min),
            out_max: repr.out_max.unwrap_or(defaults.out_max),
            sens: repr.sens.unwrap_or(defaults.sens),
            exp_power: repr.exp_power.unwrap_or(defaults.exp_power),
            lerp_enabled: repr.lerp_enabled.unwrap_or(defaults.lerp_enabled),
            lerp_factor: repr.lerp_factor.unwrap_or(defaults.lerp_factor),
        }
    }
}

/// The two axis mappings of a group.
///
/// A stored axis that cannot be read (bad point index, wrong value type,
/// unknown mode) loads as `none` without affecting the other axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupMappings {
    #[serde(deserialize_with = "lenient_mapping")]
    pub x: AxisMapping,
    #[serde(deserialize_with = "lenient_mapping")]
    pub y: AxisMapping,
}

fn lenient_mapping<'de, D: Deserializer<'de>>(deserializer: D) -> Result<AxisMapping, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_else(|e| {
        warn!("Malformed axis mapping loaded as 'none': {}", e);
        AxisMapping::default()
    }))
}

impl GroupMappings {
    pub fn axis(&self, axis: Axis) -> &AxisMapping {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }

    pub fn axis_mut(&mut self, axis: Axis) -> &mut AxisMapping {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    /// A group with both axes set to `none` produces no output.
    pub fn is_configured(&self) -> bool {
        self.x.is_active() || self.y.is_active()
    }
}
