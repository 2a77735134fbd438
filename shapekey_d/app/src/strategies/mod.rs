pub mod generic_udp;
pub mod stdout;

use anyhow::Result;
use common::{AppConfig, FramePayload, IntegrationAdapter, OutputMode};
use generic_udp::GenericUdpStrategy;
use stdout::StdoutStrategy;

pub enum PlatformBackend {
    Udp(GenericUdpStrategy),
    Stdout(StdoutStrategy),
}

impl IntegrationAdapter for PlatformBackend {
    fn initialize(&mut self) -> Result<()> {
        match self {
            Self::Udp(s) => s.initialize(),
            Self::Stdout(s) => s.initialize(),
        }
    }

    fn send(&self, payload: &FramePayload) -> Result<()> {
        match self {
            Self::Udp(s) => s.send(payload),
            Self::Stdout(s) => s.send(payload),
        }
    }
}

pub fn create_strategy(config: &AppConfig) -> PlatformBackend {
    match config.output_mode {
        OutputMode::Udp => PlatformBackend::Udp(GenericUdpStrategy::new(config.target_address())),
        OutputMode::Stdout => PlatformBackend::Stdout(StdoutStrategy),
    }
}
