use api::AxisPair;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::axis::Axis;
use crate::engine::FrameOutput;

/// Values of the currently selected group.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SelectedReadout {
    pub group: String,
    pub raw: AxisPair,
    pub value: AxisPair,
}

/// Frame-loop state published for display and calibration.
///
/// Written once per frame by the frame loop, read by the control surface.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Readout {
    pub frame_count: u64,
    pub timestamp_ms: u64,
    pub face_detected: bool,
    pub selected: Option<SelectedReadout>,
    pub last_raw: BTreeMap<String, AxisPair>,
    pub points: BTreeSet<usize>,
}

impl Readout {
    pub fn record_frame(&mut self, output: &FrameOutput, selected: Option<&str>, timestamp_ms: u64) {
        self.frame_count += 1;
        self.timestamp_ms = timestamp_ms;
        self.face_detected = true;
        self.points = output.points.clone();
        self.last_raw = output.raw.clone();
        self.selected = selected.and_then(|group| {
            let raw = output.raw.get(group)?;
            let value = output.payload.get(group)?;
            Some(SelectedReadout {
                group: group.to_string(),
                raw: *raw,
                value: *value,
            })
        });
    }

    pub fn record_no_face(&mut self, timestamp_ms: u64) {
        self.timestamp_ms = timestamp_ms;
        self.face_detected = false;
        self.points.clear();
    }

    pub fn last_raw(&self, group: &str, axis: Axis) -> Option<f32> {
        self.last_raw.get(group).map(|pair| match axis {
            Axis::X => pair.x,
            Axis::Y => pair.y,
        })
    }
}
