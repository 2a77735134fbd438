use anyhow::Result;
use common::{FramePayload, IntegrationAdapter};
use std::io::Write;

/// Writes each frame as one JSON line on stdout.
#[derive(Default)]
pub struct StdoutStrategy;

impl IntegrationAdapter for StdoutStrategy {
    fn initialize(&mut self) -> Result<()> {
        Ok(())
    }

    fn send(&self, payload: &FramePayload) -> Result<()> {
        let line = serde_json::to_string(payload)?;
        let mut out = std::io::stdout().lock();
        writeln!(out, "{}", line)?;
        Ok(())
    }
}
