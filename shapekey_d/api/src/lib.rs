pub mod landmarks;

use anyhow::Result;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use landmarks::{EyeLandmarks, EYE_LEFT, EYE_RIGHT};

/// One detector frame: an ordered list of face mesh points.
///
/// `x` and `y` are normalized image coordinates in `[0, 1]`, `z` is depth
/// relative to the face centre.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LandmarkSnapshot {
    pub timestamp_ms: u64,
    pub points: Vec<Vec3>,
}

impl LandmarkSnapshot {
    pub fn new(timestamp_ms: u64, points: Vec<Vec3>) -> Self {
        Self {
            timestamp_ms,
            points,
        }
    }

    pub fn get(&self, index: usize) -> Option<Vec3> {
        self.points.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Output of one group for one frame, each component in `[-1, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AxisPair {
    pub x: f32,
    pub y: f32,
}

/// Per-frame record handed to the transport: group name to `{x, y}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FramePayload {
    pub groups: BTreeMap<String, AxisPair>,
}

impl FramePayload {
    pub fn insert(&mut self, group: impl Into<String>, values: AxisPair) {
        self.groups.insert(group.into(), values);
    }

    pub fn get(&self, group: &str) -> Option<&AxisPair> {
        self.groups.get(group)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

/// Result of polling a landmark source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// The snapshot was refreshed with a detected face.
    Face,
    /// A frame was processed but no face was found; the snapshot is stale.
    NoFace,
    /// No new frame is available yet.
    Pending,
}

/// Settings handed to a source on initialization.
#[derive(Debug, Clone, Default)]
pub struct SourceSettings {
    pub camera_index: i32,
}

/// log level for module logging
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Error = 1,
    Warn = 2,
    Info = 3,
    Debug = 4,
    Trace = 5,
}

/// logger callback for modules
pub type LogCallback =
    extern "C" fn(level: LogLevel, target: *const std::ffi::c_char, message: *const std::ffi::c_char);

/// Logger interface for source plugins
pub struct ModuleLogger {
    callback: LogCallback,
    module_name: String,
}

impl ModuleLogger {
    pub fn new(callback: LogCallback, module_name: String) -> Self {
        Self {
            callback,
            module_name,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message);
    }

    pub fn trace(&self, message: &str) {
        self.log(LogLevel::Trace, message);
    }

    fn log(&self, level: LogLevel, message: &str) {
        // Interior NULs would truncate the C string; strip them instead of failing.
        let target = std::ffi::CString::new(self.module_name.replace('\0', "")).unwrap_or_default();
        let msg = std::ffi::CString::new(message.replace('\0', "")).unwrap_or_default();
        (self.callback)(level, target.as_ptr(), msg.as_ptr());
    }
}

/// A face landmark detector driving the frame loop.
pub trait LandmarkSource: Send {
    fn initialize(&mut self, logger: ModuleLogger, settings: &SourceSettings) -> Result<()>;
    fn update(&mut self, snapshot: &mut LandmarkSnapshot) -> Result<Detection>;
    fn unload(&mut self);
}
