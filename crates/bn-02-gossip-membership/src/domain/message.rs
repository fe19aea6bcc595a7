//! # Gossip Wire Model
//!
//! Messages are JSON with camelCase fields:
//!
//! ```text
//! { "messageId", "originId", "type", "incarnation", "ttl", "payload" }
//! ```
//!
//! and travel inside a [`GossipEnvelope`] that names the relaying node, so a
//! receiver can exclude the sender when it forwards.
//!
//! The message id is SHA-256 over origin, sequence, type, incarnation and
//! payload. Relays keep it unchanged, so copies arriving over different
//! paths collide in the dedup cache.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::NodeId;
use std::fmt;

use super::entities::{MemberUpdate, PeerState};
use super::errors::GossipError;

/// Deterministic 32-byte message identifier.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(#[serde(with = "shared_types::hex_bytes")] pub [u8; 32]);

impl MessageId {
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({self})")
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..6] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// Gossip message kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Join,
    Heartbeat,
    Suspect,
    Dead,
    Leave,
}

impl MessageType {
    /// State the message asserts about its subject.
    pub fn implied_state(&self) -> PeerState {
        match self {
            Self::Join | Self::Heartbeat => PeerState::Alive,
            Self::Suspect => PeerState::Suspect,
            Self::Dead | Self::Leave => PeerState::Dead,
        }
    }

    /// Message kind that disseminates a stored state.
    pub fn for_state(state: PeerState) -> Self {
        match state {
            PeerState::Alive => Self::Heartbeat,
            PeerState::Suspect => Self::Suspect,
            PeerState::Dead => Self::Dead,
        }
    }

    fn tag(&self) -> u8 {
        match self {
            Self::Join => 0,
            Self::Heartbeat => 1,
            Self::Suspect => 2,
            Self::Dead => 3,
            Self::Leave => 4,
        }
    }
}

/// Message body: the peer the message is about, plus an optional snapshot.
///
/// The snapshot is only filled in a reply to `Join`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GossipPayload {
    pub subject: NodeId,
    pub url: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub snapshot: Vec<MemberUpdate>,
}

/// One gossip message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GossipMessage {
    pub message_id: MessageId,
    pub origin_id: NodeId,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    /// Incarnation of `payload.subject` being asserted.
    pub incarnation: u64,
    pub ttl: u32,
    pub payload: GossipPayload,
}

impl GossipMessage {
    /// Build a message and derive its id.
    pub fn new(
        origin_id: NodeId,
        sequence: u64,
        message_type: MessageType,
        incarnation: u64,
        ttl: u32,
        payload: GossipPayload,
    ) -> Self {
        let message_id = Self::compute_id(&origin_id, sequence, message_type, incarnation, &payload);
        Self {
            message_id,
            origin_id,
            message_type,
            incarnation,
            ttl,
            payload,
        }
    }

    /// SHA-256 over the identifying fields. TTL is excluded so relays keep the id.
    pub fn compute_id(
        origin_id: &NodeId,
        sequence: u64,
        message_type: MessageType,
        incarnation: u64,
        payload: &GossipPayload,
    ) -> MessageId {
        let mut hasher = Sha256::new();
        hasher.update(origin_id.as_bytes());
        hasher.update(sequence.to_be_bytes());
        hasher.update([message_type.tag()]);
        hasher.update(incarnation.to_be_bytes());
        hasher.update(payload.subject.as_bytes());
        hasher.update((payload.url.len() as u64).to_be_bytes());
        hasher.update(payload.url.as_bytes());
        for entry in &payload.snapshot {
            hasher.update(entry.peer_id.as_bytes());
            hasher.update(entry.incarnation.to_be_bytes());
            hasher.update([entry.state.tag()]);
            hasher.update((entry.url.len() as u64).to_be_bytes());
            hasher.update(entry.url.as_bytes());
        }
        MessageId(hasher.finalize().into())
    }

    /// The membership claim this message carries about its subject.
    pub fn update(&self) -> MemberUpdate {
        MemberUpdate::new(
            self.payload.subject,
            self.payload.url.clone(),
            self.incarnation,
            self.message_type.implied_state(),
        )
    }

    /// Copy for relaying with the hop budget spent by one.
    pub fn relayed(&self) -> Self {
        Self {
            ttl: self.ttl.saturating_sub(1),
            ..self.clone()
        }
    }
}

/// Transport frame: a message plus the node that sent this copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GossipEnvelope {
    pub from: NodeId,
    pub message: GossipMessage,
}

impl GossipEnvelope {
    pub fn new(from: NodeId, message: GossipMessage) -> Self {
        Self { from, message }
    }

    pub fn encode(&self) -> Result<Vec<u8>, GossipError> {
        serde_json::to_vec(self).map_err(|e| GossipError::Encode(e.to_string()))
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, GossipError> {
        serde_json::from_slice(bytes).map_err(|e| GossipError::Decode(e.to_string()))
    }
}
