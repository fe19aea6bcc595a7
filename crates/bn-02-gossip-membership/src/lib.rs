//! # Gossip Membership (BN-02)
//!
//! SWIM-style membership and failure detection for signing nodes.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): membership table, merge rule, dedup cache, wire model
//! - **Ports Layer** (`ports/`): `GossipApi` inbound; `GossipTransport`, `TimeSource` outbound
//! - **Service Layer** (`service/`): message handling and periodic activities
//! - **Adapters** (`adapters/`): clock, in-memory transport, UDP (`network` feature)
//!
//! ## Protocol
//!
//! A peer moves `Alive -> Suspect -> Dead -> (removed)` on silence and
//! returns to `Alive` only with a higher incarnation. Claims merge under a
//! total order (higher incarnation wins, then `Dead > Suspect > Alive`), so
//! every node converges whatever the delivery order. A node that hears
//! itself suspected raises its incarnation and announces `Alive`.
//!
//! Messages carry a hop budget (`ttl`) and a reproducible id; the dedup
//! cache makes receipt idempotent.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use adapters::{InMemoryTransport, SystemTimeSource};
#[cfg(feature = "network")]
pub use adapters::{parse_peer_addr, UdpTransport};
pub use domain::{
    DedupCache, GossipConfig, GossipEnvelope, GossipError, GossipMessage, GossipPayload,
    MemberUpdate, MembershipTable, MergeOutcome, MessageId, MessageType, PeerRecord, PeerState,
    StateCounts, Timestamp,
};
pub use ports::{
    GossipApi, GossipStats, GossipTransport, ReceiveOutcome, SweepReport, TickReport, TimeSource,
    TransportError,
};
pub use service::GossipService;
