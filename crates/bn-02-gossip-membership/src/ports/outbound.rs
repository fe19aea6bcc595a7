//! # Outbound Ports (Driven Ports / SPI)
//!
//! What the gossip service needs from its environment.

use thiserror::Error;

use crate::domain::{GossipEnvelope, Timestamp};

/// Errors from the network layer. Logged and never fatal.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The destination did not accept the datagram.
    #[error("Peer unreachable: {0}")]
    Unreachable(String),

    /// The peer URL could not be resolved to an address.
    #[error("Invalid peer address: {0}")]
    InvalidAddress(String),

    /// Encoded message exceeds the transport's frame size.
    #[error("Message too large: {size} bytes (max {max})")]
    MessageTooLarge { size: usize, max: usize },

    /// The envelope could not be serialized.
    #[error("Encoding failed: {0}")]
    Encoding(String),
}

/// Message-oriented, fire-and-forget send.
///
/// Implementations must not block waiting for the peer: a slow or
/// unreachable peer may only cost the caller an error return.
pub trait GossipTransport: Send + Sync {
    fn send(&self, url: &str, envelope: &GossipEnvelope) -> Result<(), TransportError>;
}

impl<T: GossipTransport + ?Sized> GossipTransport for std::sync::Arc<T> {
    fn send(&self, url: &str, envelope: &GossipEnvelope) -> Result<(), TransportError> {
        (**self).send(url, envelope)
    }
}

/// Abstract interface for getting current time.
///
/// Injected so timeouts can be tested with simulated time.
pub trait TimeSource: Send + Sync {
    fn now(&self) -> Timestamp;
}
