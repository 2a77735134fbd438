pub use api::{AxisPair, FramePayload, LandmarkSnapshot};

pub mod axis;
pub mod calibration;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod face_frame;
pub mod geometry;
pub mod group;
pub mod iris;
pub mod peer;
pub mod readout;
pub mod session;
pub mod shaper;
pub mod smoothing;

pub use axis::{Axis, AxisMapping, AxisMode, GroupMappings};
pub use calibration::RadiusBound;
pub use config::{AppConfig, ConfigStore, OutputMode};
pub use engine::{AxisEngine, FrameOutput};
pub use error::ExtractError;
pub use group::{GroupTable, ReconcileReport};
pub use iris::{EyeSide, IrisTracker};
pub use peer::PeerMessage;
pub use readout::{Readout, SelectedReadout};
pub use session::{FrameSettings, Session};
pub use smoothing::Lerp;

/// Destination for per-frame payloads.
pub trait IntegrationAdapter: Send + Sync {
    fn initialize(&mut self) -> anyhow::Result<()>;
    fn send(&self, payload: &FramePayload) -> anyhow::Result<()>;
}
