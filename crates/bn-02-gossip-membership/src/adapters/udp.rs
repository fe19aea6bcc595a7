//! JSON-over-UDP transport.
//!
//! Peer URLs are `udp://host:port` or bare `host:port` with a literal IP.
//! Sends use `try_send_to` and never wait: a full socket buffer is reported
//! as `Unreachable` and the peer is skipped for the round.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;

use crate::domain::{GossipEnvelope, GossipError};
use crate::ports::{GossipTransport, TransportError};

/// Largest datagram the transport sends or accepts: the IPv4 UDP payload
/// limit (65535 minus 8 bytes of UDP header and 20 of IP header).
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// Parse a peer URL into a socket address.
pub fn parse_peer_addr(url: &str) -> Result<SocketAddr, TransportError> {
    url.strip_prefix("udp://")
        .unwrap_or(url)
        .parse()
        .map_err(|_| TransportError::InvalidAddress(url.to_string()))
}

/// Shared UDP socket for gossip traffic.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
}

impl UdpTransport {
    pub async fn bind(addr: SocketAddr) -> std::io::Result<Self> {
        let socket = UdpSocket::bind(addr).await?;
        Ok(Self {
            socket: Arc::new(socket),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }

    /// Wait for the next datagram and decode it.
    ///
    /// Socket errors are returned as `Err(io)`; undecodable datagrams as
    /// `Ok(Err(..))` so the receive loop can log and continue.
    pub async fn recv_envelope(
        &self,
    ) -> std::io::Result<(SocketAddr, Result<GossipEnvelope, GossipError>)> {
        let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
        let (len, from) = self.socket.recv_from(&mut buf).await?;
        Ok((from, GossipEnvelope::decode(&buf[..len])))
    }
}

impl GossipTransport for UdpTransport {
    fn send(&self, url: &str, envelope: &GossipEnvelope) -> Result<(), TransportError> {
        let addr = parse_peer_addr(url)?;
        let bytes = envelope
            .encode()
            .map_err(|e| TransportError::Encoding(e.to_string()))?;
        if bytes.len() > MAX_DATAGRAM_SIZE {
            return Err(TransportError::MessageTooLarge {
                size: bytes.len(),
                max: MAX_DATAGRAM_SIZE,
            });
        }
        self.socket
            .try_send_to(&bytes, addr)
            .map(|_| ())
            .map_err(|e| TransportError::Unreachable(format!("{addr}: {e}")))
    }
}
