use api::{AxisPair, FramePayload, LandmarkSnapshot};
use log::trace;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::axis::{Axis, AxisMapping};
use crate::error::ExtractError;
use crate::extract::extract_axis;
use crate::face_frame::FaceFrame;
use crate::group::GroupTable;
use crate::iris::IrisTracker;
use crate::shaper::shape;
use crate::smoothing::Lerp;

#[derive(Debug, Clone, Copy, Default)]
struct AxisState {
    lerp: Lerp,
    last_raw: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct GroupState {
    x: AxisState,
    y: AxisState,
}

impl GroupState {
    fn axis_mut(&mut self, axis: Axis) -> &mut AxisState {
        match axis {
            Axis::X => &mut self.x,
            Axis::Y => &mut self.y,
        }
    }

    fn axis(&self, axis: Axis) -> &AxisState {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
        }
    }
}

/// Everything one frame produced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameOutput {
    /// Smoothed, clamped values per configured group.
    pub payload: FramePayload,
    /// Most recent raw value per configured group.
    pub raw: BTreeMap<String, AxisPair>,
    /// Landmarks consulted this frame.
    pub points: BTreeSet<usize>,
}

/// Per-frame landmark to axis-value transform with its temporal state.
///
/// Owned by the frame loop; the group table is passed in as a snapshot
/// every frame.
#[derive(Debug, Default)]
pub struct AxisEngine {
    iris: IrisTracker,
    groups: HashMap<String, GroupState>,
}

impl AxisEngine {
    pub fn new(iris: IrisTracker) -> Self {
        Self {
            iris,
            groups: HashMap::new(),
        }
    }

    pub fn iris(&self) -> &IrisTracker {
        &self.iris
    }

    pub fn iris_mut(&mut self) -> &mut IrisTracker {
        &mut self.iris
    }

    /// Runs one frame. Fails only when the snapshot lacks the face frame
    /// landmarks; individual axes that fail hold their previous value.
    pub fn process(
        &mut self,
        snapshot: &LandmarkSnapshot,
        table: &GroupTable,
    ) -> Result<FrameOutput, ExtractError> {
        let face = FaceFrame::from_snapshot(snapshot)?;
        self.iris.begin_frame();
        self.groups.retain(|name, _| table.contains(name));

        let mut output = FrameOutput::default();

        for (name, mappings) in table.iter() {
            if !mappings.is_configured() {
                continue;
            }

            let state = self.groups.entry(name.to_string()).or_default();
            let mut values = AxisPair::default();
            let mut raw = AxisPair::default();

            for axis in Axis::ALL {
                let mapping = mappings.axis(axis);
                let axis_state = state.axis_mut(axis);

                let value = match extract_axis(mapping, axis, snapshot, &face, &mut self.iris) {
                    Ok(sample) => {
                        axis_state.last_raw = sample.value;
                        output.points.extend(sample.points);
                        smooth(axis_state, mapping, shape(mapping, sample.value))
                    }
                    Err(e) => {
                        trace!("{}.{} held: {}", name, axis, e);
                        axis_state.lerp.value()
                    }
                };

                match axis {
                    Axis::X => {
                        values.x = value;
                        raw.x = axis_state.last_raw;
                    }
                    Axis::Y => {
                        values.y = value;
                        raw.y = axis_state.last_raw;
                    }
                }
            }

            output.payload.insert(name, values);
            output.raw.insert(name.to_string(), raw);
        }

        Ok(output)
    }

    /// Raw value of `axis` in `group` from the last frame it was extracted.
    pub fn last_raw(&self, group: &str, axis: Axis) -> Option<f32> {
        self.groups.get(group).map(|s| s.axis(axis).last_raw)
    }

    /// Smoothed output of `axis` in `group` from the last frame.
    pub fn smoothed(&self, group: &str, axis: Axis) -> Option<f32> {
        self.groups.get(group).map(|s| s.axis(axis).lerp.value())
    }

    /// Drops all temporal state for `group`.
    pub fn forget_group(&mut self, group: &str) {
        self.groups.remove(group);
    }

    pub fn tracked_groups(&self) -> usize {
        self.groups.len()
    }
}

fn smooth(state: &mut AxisState, mapping: &AxisMapping, shaped: f32) -> f32 {
    // An inactive axis is pinned to zero, smoothing or not.
    let enabled = mapping.lerp_enabled && mapping.is_active();
    state
        .lerp
        .filter(shaped, enabled, mapping.effective_lerp_factor())
}
