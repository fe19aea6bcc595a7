//! # Gossip Errors

use thiserror::Error;

/// Errors raised by the membership protocol.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GossipError {
    /// A wire message could not be decoded.
    #[error("Failed to decode gossip message: {0}")]
    Decode(String),

    /// A message could not be encoded.
    #[error("Failed to encode gossip message: {0}")]
    Encode(String),

    /// The table is full and holds no dead record to evict.
    #[error("Membership table full ({max_peers} peers)")]
    CapacityReached { max_peers: usize },

    /// Invalid configuration value.
    #[error("Invalid gossip config: {0}")]
    Config(String),
}
