//! # Gossip Configuration
//!
//! All intervals and timeouts are in milliseconds.

use serde::{Deserialize, Serialize};

use super::errors::GossipError;

/// Protocol timing, fanout and memory bounds.
///
/// - `suspicion_timeout_ms`: silence after which an `Alive` peer becomes `Suspect`
/// - `cleanup_timeout_ms`: time in `Suspect` before the peer is declared `Dead`
/// - `dead_grace_period_ms`: time in `Dead` before the record is removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GossipConfig {
    /// Own-heartbeat period (default: 5s)
    pub heartbeat_interval_ms: u64,
    /// Membership dissemination period (default: 2s)
    pub gossip_interval_ms: u64,
    /// Default: 15s
    pub suspicion_timeout_ms: u64,
    /// Default: 30s
    pub cleanup_timeout_ms: u64,
    /// Default: equal to `cleanup_timeout_ms`
    pub dead_grace_period_ms: u64,
    /// Peers contacted per round (default: 3)
    pub fanout: usize,
    /// Hop budget for originated messages (default: 3)
    pub max_ttl: u32,
    /// Dedup cache capacity (default: 1000)
    pub max_message_history: usize,
    /// Membership table capacity (default: 256)
    pub max_peers: usize,
    /// Recently changed entries sent per gossip tick (default: 10)
    pub gossip_batch_size: usize,
}

impl Default for GossipConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_ms: 5_000,
            gossip_interval_ms: 2_000,
            suspicion_timeout_ms: 15_000,
            cleanup_timeout_ms: 30_000,
            dead_grace_period_ms: 30_000,
            fanout: 3,
            max_ttl: 3,
            max_message_history: 1_000,
            max_peers: 256,
            gossip_batch_size: 10,
        }
    }
}

impl GossipConfig {
    /// Small, fast values for tests.
    pub fn for_testing() -> Self {
        Self {
            heartbeat_interval_ms: 100,
            gossip_interval_ms: 50,
            suspicion_timeout_ms: 1_000,
            cleanup_timeout_ms: 2_000,
            dead_grace_period_ms: 2_000,
            fanout: 2,
            max_ttl: 3,
            max_message_history: 64,
            max_peers: 16,
            gossip_batch_size: 4,
        }
    }

    /// Reject values that would stall or unbound the protocol.
    pub fn validate(&self) -> Result<(), GossipError> {
        let positive = [
            ("heartbeat_interval_ms", self.heartbeat_interval_ms),
            ("gossip_interval_ms", self.gossip_interval_ms),
            ("suspicion_timeout_ms", self.suspicion_timeout_ms),
            ("cleanup_timeout_ms", self.cleanup_timeout_ms),
            ("fanout", self.fanout as u64),
            ("max_message_history", self.max_message_history as u64),
            ("max_peers", self.max_peers as u64),
            ("gossip_batch_size", self.gossip_batch_size as u64),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(GossipError::Config(format!("{name} must be greater than zero")));
        }
        if self.suspicion_timeout_ms <= self.heartbeat_interval_ms {
            return Err(GossipError::Config(
                "suspicion_timeout_ms must exceed heartbeat_interval_ms".into(),
            ));
        }
        Ok(())
    }
}
