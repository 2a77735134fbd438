use anyhow::{bail, Context, Result};
use common::{FramePayload, IntegrationAdapter};
use log::{info, trace};
use std::io::ErrorKind;
use std::net::UdpSocket;

/// Largest JSON record that fits one IPv4 UDP datagram.
pub const MAX_RECORD_BYTES: usize = 65_507;

/// Sends each frame to the animation consumer as one JSON datagram.
///
/// A full socket buffer drops the frame silently. A frame whose record would
/// not fit a datagram is rejected whole rather than split.
pub struct GenericUdpStrategy {
    socket: Option<UdpSocket>,
    target_address: String,
}

impl GenericUdpStrategy {
    pub fn new(target_address: String) -> Self {
        Self {
            socket: None,
            target_address,
        }
    }

    pub fn target_address(&self) -> &str {
        &self.target_address
    }

    /// Encodes `payload` as the record sent on the wire.
    pub fn encode(payload: &FramePayload) -> Result<Vec<u8>> {
        let record = serde_json::to_vec(payload).context("Failed to encode frame")?;
        if record.len() > MAX_RECORD_BYTES {
            bail!(
                "Frame with {} group(s) is {} bytes, over the {} byte datagram limit",
                payload.len(),
                record.len(),
                MAX_RECORD_BYTES
            );
        }
        Ok(record)
    }
}

impl IntegrationAdapter for GenericUdpStrategy {
    fn initialize(&mut self) -> Result<()> {
        info!("Initializing UDP output...");
        let socket = UdpSocket::bind("0.0.0.0:0").context("Failed to bind UDP socket")?;
        socket
            .connect(&self.target_address)
            .with_context(|| format!("Failed to resolve target {}", self.target_address))?;
        socket
            .set_nonblocking(true)
            .context("Failed to set non-blocking mode")?;

        self.socket = Some(socket);
        info!("Sending frames to {}", self.target_address);
        Ok(())
    }

    fn send(&self, payload: &FramePayload) -> Result<()> {
        let Some(socket) = &self.socket else {
            return Ok(());
        };
        let record = Self::encode(payload)?;

        match socket.send(&record) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::WouldBlock => {
                trace!("Socket buffer full, frame dropped");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::ConnectionRefused => {
                bail!("Nothing is listening on {}", self.target_address)
            }
            Err(e) => Err(e).with_context(|| format!("Failed to send frame to {}", self.target_address)),
        }
    }
}
