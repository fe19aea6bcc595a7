//! # Inbound Ports (Driving Ports / API)
//!
//! The surface the runtime drives: message receipt, periodic activities,
//! and the informational peer list and stats.

use serde::Serialize;
use shared_types::NodeId;

use crate::domain::{GossipEnvelope, MergeOutcome, PeerRecord};

/// What happened to one received message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveOutcome {
    /// Already seen; dropped without effect.
    Duplicate,
    /// Recorded, merged and possibly forwarded.
    Processed {
        merge: Option<MergeOutcome>,
        refuted: bool,
        forwarded: usize,
    },
}

/// Sends attempted by one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub sent: usize,
    pub failed: usize,
}

/// State changes made by one suspicion sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub suspected: Vec<NodeId>,
    pub declared_dead: Vec<NodeId>,
    pub sends: TickReport,
}

/// Counters exposed by `getStats`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GossipStats {
    pub peer_count: usize,
    pub alive: usize,
    pub suspect: usize,
    pub dead: usize,
    /// Distinct message ids recorded, received or originated.
    pub messages_seen: u64,
    pub messages_received: u64,
    pub duplicates_dropped: u64,
    pub messages_forwarded: u64,
    pub send_failures: u64,
    pub dedup_entries: usize,
    pub local_incarnation: u64,
}

/// Gossip membership API.
pub trait GossipApi: Send + Sync {
    /// Handle one inbound envelope.
    fn on_envelope(&self, envelope: GossipEnvelope) -> ReceiveOutcome;

    /// Announce this node to each seed.
    fn join(&self, seed_urls: &[String]) -> TickReport;

    /// Broadcast own `Alive` to `fanout` random peers.
    fn heartbeat_tick(&self) -> TickReport;

    /// Send the most recently changed entries to `fanout` random peers.
    fn gossip_tick(&self) -> TickReport;

    /// Escalate silent peers to `Suspect` and long suspects to `Dead`.
    fn suspicion_sweep(&self) -> SweepReport;

    /// Remove peers `Dead` past the grace period.
    fn cleanup_sweep(&self) -> Vec<NodeId>;

    /// Announce departure.
    fn leave(&self) -> TickReport;

    /// Current membership, sorted by peer id.
    fn list_peers(&self) -> Vec<PeerRecord>;

    fn stats(&self) -> GossipStats;
}
