//! # Membership Entities
//!
//! - [`Timestamp`]: milliseconds since the Unix epoch
//! - [`PeerState`]: `Alive < Suspect < Dead`, the tie-break order of the merge rule
//! - [`PeerRecord`]: the table's view of one remote peer
//! - [`MemberUpdate`]: a `(peer, incarnation, state)` claim carried by gossip

use serde::{Deserialize, Serialize};
use shared_types::NodeId;
use std::fmt;

/// Milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub fn new(millis: u64) -> Self {
        Self(millis)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Add milliseconds (saturating).
    pub fn add_millis(&self, millis: u64) -> Self {
        Self(self.0.saturating_add(millis))
    }

    /// Milliseconds elapsed from `earlier` to `self`, zero if `earlier` is later.
    pub fn millis_since(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

/// Liveness state of a peer.
///
/// The derived ordering is the merge rule's severity order: at equal
/// incarnation a strictly greater state wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerState {
    Alive,
    Suspect,
    Dead,
}

impl PeerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alive => "alive",
            Self::Suspect => "suspect",
            Self::Dead => "dead",
        }
    }

    /// Wire tag used in message id hashing.
    pub(crate) fn tag(&self) -> u8 {
        match self {
            Self::Alive => 0,
            Self::Suspect => 1,
            Self::Dead => 2,
        }
    }
}

impl fmt::Display for PeerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A membership claim about one peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberUpdate {
    pub peer_id: NodeId,
    pub url: String,
    pub incarnation: u64,
    pub state: PeerState,
}

impl MemberUpdate {
    pub fn new(peer_id: NodeId, url: impl Into<String>, incarnation: u64, state: PeerState) -> Self {
        Self {
            peer_id,
            url: url.into(),
            incarnation,
            state,
        }
    }

    /// True if this claim overrides a stored `(incarnation, state)`.
    ///
    /// Higher incarnation always wins; at equal incarnation only a strictly
    /// worse state wins.
    pub fn supersedes(&self, incarnation: u64, state: PeerState) -> bool {
        self.incarnation > incarnation || (self.incarnation == incarnation && self.state > state)
    }
}

/// The table's record of a remote peer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRecord {
    pub peer_id: NodeId,
    pub url: String,
    pub incarnation: u64,
    pub state: PeerState,
    pub last_heartbeat_at: Timestamp,
    pub suspect_since: Option<Timestamp>,
    pub dead_since: Option<Timestamp>,
    /// Last time the merge rule changed this record.
    pub last_changed_at: Timestamp,
}

impl PeerRecord {
    /// Record created on first contact.
    pub fn from_update(update: &MemberUpdate, now: Timestamp) -> Self {
        let mut record = Self {
            peer_id: update.peer_id,
            url: update.url.clone(),
            incarnation: update.incarnation,
            state: PeerState::Alive,
            last_heartbeat_at: now,
            suspect_since: None,
            dead_since: None,
            last_changed_at: now,
        };
        record.transition(update.state, now);
        record
    }

    /// Apply an accepted update.
    pub(crate) fn apply(&mut self, update: &MemberUpdate, now: Timestamp) {
        let refuted = update.incarnation > self.incarnation;
        self.incarnation = update.incarnation;
        if !update.url.is_empty() {
            self.url.clone_from(&update.url);
        }
        if refuted && update.state == PeerState::Alive {
            // A fresh incarnation restarts the failure detector.
            self.last_heartbeat_at = now;
        }
        self.transition(update.state, now);
        self.last_changed_at = now;
    }

    fn transition(&mut self, state: PeerState, now: Timestamp) {
        match state {
            PeerState::Alive => {
                self.suspect_since = None;
                self.dead_since = None;
            }
            PeerState::Suspect => {
                if self.state != PeerState::Suspect || self.suspect_since.is_none() {
                    self.suspect_since = Some(now);
                }
                self.dead_since = None;
            }
            PeerState::Dead => {
                if self.state != PeerState::Dead || self.dead_since.is_none() {
                    self.dead_since = Some(now);
                }
            }
        }
        self.state = state;
    }

    /// The claim this record currently represents.
    pub fn to_update(&self) -> MemberUpdate {
        MemberUpdate::new(self.peer_id, self.url.clone(), self.incarnation, self.state)
    }

    pub fn is_alive(&self) -> bool {
        self.state == PeerState::Alive
    }
}
