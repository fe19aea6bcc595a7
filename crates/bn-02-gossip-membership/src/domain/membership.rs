//! # Membership Table
//!
//! Authoritative per-peer state. Every mutation goes through [`MembershipTable::merge`]
//! except heartbeat refreshes and timed removal.
//!
//! ## Invariants
//!
//! - `len() <= max_peers`
//! - A stored `(incarnation, state)` only moves forward under the merge order

use std::collections::HashMap;

use shared_types::NodeId;

use super::entities::{MemberUpdate, PeerRecord, PeerState, Timestamp};
use super::errors::GossipError;

/// Result of applying one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeOutcome {
    /// First contact with this peer.
    Inserted,
    /// Stored record was overridden.
    Updated { previous: PeerState },
    /// Update did not supersede the stored record.
    Ignored,
}

impl MergeOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, Self::Ignored)
    }
}

/// Per-state peer counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StateCounts {
    pub alive: usize,
    pub suspect: usize,
    pub dead: usize,
}

/// Bounded map of remote peers.
#[derive(Debug, Clone)]
pub struct MembershipTable {
    peers: HashMap<NodeId, PeerRecord>,
    max_peers: usize,
}

impl MembershipTable {
    pub fn new(max_peers: usize) -> Self {
        Self {
            peers: HashMap::new(),
            max_peers,
        }
    }

    /// Apply `update` under the merge rule.
    ///
    /// A new peer is admitted while there is room; when full, the longest-dead
    /// record is evicted to make space, otherwise the update is rejected.
    pub fn merge(&mut self, update: &MemberUpdate, now: Timestamp) -> Result<MergeOutcome, GossipError> {
        if let Some(record) = self.peers.get_mut(&update.peer_id) {
            if !update.supersedes(record.incarnation, record.state) {
                return Ok(MergeOutcome::Ignored);
            }
            let previous = record.state;
            record.apply(update, now);
            return Ok(MergeOutcome::Updated { previous });
        }

        if self.peers.len() >= self.max_peers && !self.evict_oldest_dead() {
            return Err(GossipError::CapacityReached {
                max_peers: self.max_peers,
            });
        }
        self.peers
            .insert(update.peer_id, PeerRecord::from_update(update, now));
        Ok(MergeOutcome::Inserted)
    }

    /// Refresh the failure detector for a peer that heartbeated directly.
    ///
    /// Only applies to an `Alive` record at the heartbeat's incarnation or lower.
    pub fn refresh_heartbeat(&mut self, peer_id: &NodeId, incarnation: u64, now: Timestamp) -> bool {
        match self.peers.get_mut(peer_id) {
            Some(record) if record.is_alive() && incarnation >= record.incarnation => {
                record.last_heartbeat_at = now;
                true
            }
            _ => false,
        }
    }

    /// `Alive` peers silent for at least `timeout_ms`.
    pub fn silent_peers(&self, now: Timestamp, timeout_ms: u64) -> Vec<MemberUpdate> {
        self.peers
            .values()
            .filter(|r| r.is_alive() && now.millis_since(r.last_heartbeat_at) >= timeout_ms)
            .map(|r| r.to_update())
            .collect()
    }

    /// `Suspect` peers whose suspicion has lasted at least `timeout_ms`.
    pub fn expired_suspects(&self, now: Timestamp, timeout_ms: u64) -> Vec<MemberUpdate> {
        self.peers
            .values()
            .filter(|r| {
                r.state == PeerState::Suspect
                    && r.suspect_since
                        .map_or(false, |since| now.millis_since(since) >= timeout_ms)
            })
            .map(|r| r.to_update())
            .collect()
    }

    /// Remove peers `Dead` for at least `grace_ms`.
    pub fn remove_expired_dead(&mut self, now: Timestamp, grace_ms: u64) -> Vec<NodeId> {
        let expired: Vec<NodeId> = self
            .peers
            .values()
            .filter(|r| {
                r.state == PeerState::Dead
                    && r.dead_since
                        .map_or(false, |since| now.millis_since(since) >= grace_ms)
            })
            .map(|r| r.peer_id)
            .collect();
        for peer_id in &expired {
            self.peers.remove(peer_id);
        }
        expired
    }

    /// Up to `limit` records, most recently changed first.
    pub fn recently_changed(&self, limit: usize) -> Vec<MemberUpdate> {
        let mut records: Vec<&PeerRecord> = self.peers.values().collect();
        records.sort_by(|a, b| {
            b.last_changed_at
                .cmp(&a.last_changed_at)
                .then_with(|| a.peer_id.cmp(&b.peer_id))
        });
        records.into_iter().take(limit).map(PeerRecord::to_update).collect()
    }

    /// Every record as an update, excluding `except`.
    pub fn snapshot(&self, except: Option<&NodeId>) -> Vec<MemberUpdate> {
        self.peers
            .values()
            .filter(|r| Some(&r.peer_id) != except)
            .map(PeerRecord::to_update)
            .collect()
    }

    /// `(id, url)` of peers that are not `Dead`, excluding `exclude`.
    pub fn reachable(&self, exclude: &[NodeId]) -> Vec<(NodeId, String)> {
        self.peers
            .values()
            .filter(|r| r.state != PeerState::Dead && !exclude.contains(&r.peer_id))
            .map(|r| (r.peer_id, r.url.clone()))
            .collect()
    }

    pub fn get(&self, peer_id: &NodeId) -> Option<&PeerRecord> {
        self.peers.get(peer_id)
    }

    pub fn remove(&mut self, peer_id: &NodeId) -> Option<PeerRecord> {
        self.peers.remove(peer_id)
    }

    /// Records sorted by peer id.
    pub fn records(&self) -> Vec<PeerRecord> {
        let mut records: Vec<PeerRecord> = self.peers.values().cloned().collect();
        records.sort_by(|a, b| a.peer_id.cmp(&b.peer_id));
        records
    }

    pub fn counts(&self) -> StateCounts {
        self.peers
            .values()
            .fold(StateCounts::default(), |mut acc, r| {
                match r.state {
                    PeerState::Alive => acc.alive += 1,
                    PeerState::Suspect => acc.suspect += 1,
                    PeerState::Dead => acc.dead += 1,
                }
                acc
            })
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    pub fn max_peers(&self) -> usize {
        self.max_peers
    }

    fn evict_oldest_dead(&mut self) -> bool {
        let oldest = self
            .peers
            .values()
            .filter(|r| r.state == PeerState::Dead)
            .min_by_key(|r| (r.dead_since.unwrap_or(r.last_changed_at), r.peer_id))
            .map(|r| r.peer_id);
        match oldest {
            Some(peer_id) => {
                self.peers.remove(&peer_id);
                true
            }
            None => false,
        }
    }
}
