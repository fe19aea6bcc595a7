//! # Adapters
//!
//! - [`SystemTimeSource`]: wall clock in milliseconds
//! - [`InMemoryTransport`]: records sends, with per-URL failure injection
//! - `UdpTransport` (`network` feature): JSON datagrams over a tokio socket

mod memory;
mod time;
#[cfg(feature = "network")]
mod udp;

pub use memory::InMemoryTransport;
pub use time::SystemTimeSource;
#[cfg(feature = "network")]
pub use udp::{parse_peer_addr, UdpTransport, MAX_DATAGRAM_SIZE};
