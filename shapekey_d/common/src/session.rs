use crate::axis::{Axis, AxisMapping};
use crate::calibration::{calibrate, RadiusBound};
use crate::config::AppConfig;
use crate::group::{GroupTable, ReconcileReport};
use crate::iris::EyeSide;
use crate::readout::Readout;

/// Frame-loop view of the user-editable state, copied once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSettings {
    pub groups: GroupTable,
    pub selected: Option<String>,
    pub send_enabled: bool,
    pub blink_ratio: f32,
}

/// User-editable state: the config and the group selected for display.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub config: AppConfig,
    selected: Option<String>,
}

impl Session {
    pub fn new(config: AppConfig) -> Self {
        let selected = config.groups.names().next().map(str::to_string);
        Self { config, selected }
    }

    pub fn groups(&self) -> &GroupTable {
        &self.config.groups
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn frame_settings(&self) -> FrameSettings {
        FrameSettings {
            groups: self.config.groups.clone(),
            selected: self.selected.clone(),
            send_enabled: self.config.send_enabled,
            blink_ratio: self.config.blink_ratio,
        }
    }

    pub fn select(&mut self, name: &str) -> bool {
        if self.config.groups.contains(name) {
            self.selected = Some(name.to_string());
            true
        } else {
            false
        }
    }

    /// Adds an empty group and selects it.
    pub fn add_group(&mut self, name: &str) -> bool {
        if !self.config.groups.add(name) {
            return false;
        }
        self.selected = Some(name.trim().to_string());
        true
    }

    pub fn remove_group(&mut self, name: &str) -> bool {
        if self.config.groups.remove(name).is_none() {
            return false;
        }
        self.fix_selection();
        true
    }

    pub fn set_axis(&mut self, name: &str, axis: Axis, mapping: AxisMapping) -> bool {
        self.config.groups.set_axis(name, axis, mapping)
    }

    pub fn apply_iris_preset(&mut self, name: &str, axis: Axis, eye: EyeSide) -> Option<AxisMapping> {
        let group = self.config.groups.get_mut(name)?;
        let preset = AxisMapping::iris_preset(eye, axis);
        let mapping = group.axis_mut(axis);
        // Keep the user's smoothing choice.
        let (lerp_enabled, lerp_factor) = (mapping.lerp_enabled, mapping.lerp_factor);
        *mapping = AxisMapping {
            lerp_enabled,
            lerp_factor,
            ..preset
        };
        Some(mapping.clone())
    }

    pub fn reconcile(&mut self, peer_groups: &[String]) -> ReconcileReport {
        let report = self.config.groups.reconcile(peer_groups);
        self.fix_selection();
        report
    }

    /// Replaces the whole group table, as on config import.
    pub fn replace_groups(&mut self, groups: GroupTable) {
        self.config.groups = groups;
        self.fix_selection();
    }

    pub fn calibrate(&mut self, readout: &Readout, axis: Axis, bound: RadiusBound) -> Option<f32> {
        calibrate(
            &mut self.config.groups,
            self.selected.as_deref(),
            readout,
            axis,
            bound,
        )
    }

    fn fix_selection(&mut self) {
        let still_there = self
            .selected
            .as_deref()
            .is_some_and(|name| self.config.groups.contains(name));
        if !still_there {
            self.selected = self.config.groups.names().next().map(str::to_string);
        }
    }
}
