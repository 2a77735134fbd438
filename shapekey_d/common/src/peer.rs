use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Request/response datagrams exchanged with the animation consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PeerMessage {
    #[serde(rename = "GET_GROUPS")]
    GetGroups,
    #[serde(rename = "GROUPS")]
    Groups {
        #[serde(default)]
        groups: Vec<String>,
    },
}

impl PeerMessage {
    pub fn encode(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(self).context("Failed to encode peer message")
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).context("Failed to decode peer message")
    }
}
