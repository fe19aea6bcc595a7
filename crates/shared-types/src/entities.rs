//! # Core Identifiers
//!
//! - [`NodeId`]: 32-byte opaque node identifier, immutable for the node's lifetime
//! - [`TxHash`]: 32-byte transaction hash returned by the chain client

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::errors::HexError;
use crate::hex_bytes::{decode_fixed_hex, encode_hex};

/// A 32-byte transaction hash.
pub type TxHash = [u8; 32];

/// Unique identifier for a signing node.
///
/// Serialized as `0x`-prefixed hex. Generated identities derive it as
/// SHA-256 of the compressed BLS public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct NodeId(#[serde(with = "crate::hex_bytes")] pub [u8; 32]);

impl NodeId {
    /// Create a NodeId from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Derive a NodeId by hashing arbitrary key material.
    pub fn from_key_material(material: &[u8]) -> Self {
        let digest = Sha256::digest(material);
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Get the underlying bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full `0x` hex rendering.
    pub fn to_hex(&self) -> String {
        encode_hex(&self.0)
    }

    /// First four bytes as hex, for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl AsRef<[u8]> for NodeId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.short())
    }
}

impl FromStr for NodeId {
    type Err = HexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        decode_fixed_hex::<32>("nodeId", s).map(Self)
    }
}
