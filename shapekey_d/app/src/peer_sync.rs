use anyhow::{anyhow, Context, Result};
use common::PeerMessage;
use log::{debug, info};
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::time::{timeout_at, Instant};

const MAX_DATAGRAM: usize = 65_535;

/// Asks the animation consumer at `target` for its group names.
///
/// Datagrams that are not a `GROUPS` response are skipped until `wait`
/// runs out. Nothing is retried.
pub async fn fetch_groups(target: &str, wait: Duration) -> Result<Vec<String>> {
    let socket = UdpSocket::bind("0.0.0.0:0")
        .await
        .context("Failed to bind UDP socket")?;
    let request = PeerMessage::GetGroups.encode()?;
    socket
        .send_to(&request, target)
        .await
        .with_context(|| format!("Failed to send GET_GROUPS to {}", target))?;

    let deadline = Instant::now() + wait;
    let mut buf = vec![0u8; MAX_DATAGRAM];

    loop {
        let (len, from) = timeout_at(deadline, socket.recv_from(&mut buf))
            .await
            .map_err(|_| anyhow!("No response from {} within {:?}", target, wait))?
            .context("Failed to receive group list")?;

        match PeerMessage::decode(&buf[..len]) {
            Ok(PeerMessage::Groups { groups }) => {
                info!("Received {} group(s) from {}", groups.len(), from);
                return Ok(groups);
            }
            Ok(other) => debug!("Ignoring {:?} from {}", other, from),
            Err(e) => debug!("Ignoring datagram from {}: {}", from, e),
        }
    }
}
