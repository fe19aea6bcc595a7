use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;
use rand::seq::SliceRandom;
use shared_types::NodeId;
use tracing::warn;

use crate::domain::{
    DedupCache, GossipConfig, GossipEnvelope, GossipError, GossipMessage, GossipPayload,
    MemberUpdate, MembershipTable, MessageType, PeerState, Timestamp,
};
use crate::ports::{GossipTransport, TickReport, TimeSource};

/// Sends queued while the state lock is held, dispatched after release.
pub(crate) type Outbox = Vec<(String, GossipEnvelope)>;

/// Everything the merge and dedup steps touch, behind one lock.
pub(crate) struct GossipState {
    pub(crate) table: MembershipTable,
    pub(crate) dedup: DedupCache,
    /// Own incarnation; only this node ever raises it.
    pub(crate) incarnation: u64,
    pub(crate) sequence: u64,
    pub(crate) messages_seen: u64,
    pub(crate) messages_received: u64,
    pub(crate) duplicates_dropped: u64,
    pub(crate) messages_forwarded: u64,
}

/// Gossip membership service implementing the driving port.
///
/// All methods take `&self`: share it behind an `Arc` between the timer
/// tasks and the receive loop. Check-and-update of the table and dedup
/// cache happens under a single mutex; network sends happen after the lock
/// is released and never wait for the peer.
///
/// # Example
///
/// ```rust,ignore
/// let service = GossipService::new(
///     local_id,
///     "udp://10.0.0.1:7000".into(),
///     GossipConfig::default(),
///     transport,
///     Box::new(SystemTimeSource::new()),
/// )?;
/// service.join(&seeds);
/// ```
pub struct GossipService<T: GossipTransport> {
    pub(crate) local_id: NodeId,
    pub(crate) local_url: String,
    pub(crate) config: GossipConfig,
    pub(crate) transport: T,
    pub(crate) time_source: Box<dyn TimeSource>,
    pub(crate) state: Mutex<GossipState>,
    pub(crate) send_failures: AtomicU64,
}

impl<T: GossipTransport> GossipService<T> {
    /// Create a service with an empty table at incarnation 0.
    pub fn new(
        local_id: NodeId,
        local_url: String,
        config: GossipConfig,
        transport: T,
        time_source: Box<dyn TimeSource>,
    ) -> Result<Self, GossipError> {
        config.validate()?;
        let state = GossipState {
            table: MembershipTable::new(config.max_peers),
            dedup: DedupCache::new(config.max_message_history),
            incarnation: 0,
            // Random start keeps a restarted node's ids clear of its previous run's.
            sequence: u64::from(rand::random::<u32>()),
            messages_seen: 0,
            messages_received: 0,
            duplicates_dropped: 0,
            messages_forwarded: 0,
        };
        Ok(Self {
            local_id,
            local_url,
            config,
            transport,
            time_source,
            state: Mutex::new(state),
            send_failures: AtomicU64::new(0),
        })
    }

    pub fn local_id(&self) -> NodeId {
        self.local_id
    }

    pub fn local_url(&self) -> &str {
        &self.local_url
    }

    pub fn config(&self) -> &GossipConfig {
        &self.config
    }

    pub fn local_incarnation(&self) -> u64 {
        self.state.lock().incarnation
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.time_source.now()
    }

    /// Build a message from this node and record its id as seen.
    pub(crate) fn originate(
        &self,
        state: &mut GossipState,
        message_type: MessageType,
        update: &MemberUpdate,
        ttl: u32,
        snapshot: Vec<MemberUpdate>,
    ) -> GossipMessage {
        state.sequence += 1;
        let message = GossipMessage::new(
            self.local_id,
            state.sequence,
            message_type,
            update.incarnation,
            ttl,
            GossipPayload {
                subject: update.peer_id,
                url: update.url.clone(),
                snapshot,
            },
        );
        if state.dedup.record(message.message_id) {
            state.messages_seen += 1;
        }
        message
    }

    /// This node's own `Alive` claim.
    pub(crate) fn self_update(&self, state: &GossipState) -> MemberUpdate {
        MemberUpdate::new(
            self.local_id,
            self.local_url.clone(),
            state.incarnation,
            PeerState::Alive,
        )
    }

    /// Up to `fanout` random non-dead peers, sampled without replacement.
    pub(crate) fn select_targets(
        &self,
        state: &GossipState,
        exclude: &[NodeId],
    ) -> Vec<(NodeId, String)> {
        let candidates = state.table.reachable(exclude);
        candidates
            .choose_multiple(&mut rand::thread_rng(), self.config.fanout)
            .cloned()
            .collect()
    }

    /// Queue `message` for every target.
    pub(crate) fn queue(
        &self,
        outbox: &mut Outbox,
        targets: &[(NodeId, String)],
        message: &GossipMessage,
    ) {
        for (_, url) in targets {
            outbox.push((url.clone(), GossipEnvelope::new(self.local_id, message.clone())));
        }
    }

    /// Send queued envelopes. Failures are logged and the peer skipped.
    pub(crate) fn dispatch(&self, outbox: Outbox) -> TickReport {
        let mut report = TickReport::default();
        for (url, envelope) in outbox {
            match self.transport.send(&url, &envelope) {
                Ok(()) => report.sent += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(
                        peer_url = %url,
                        message_id = %envelope.message.message_id,
                        error = %e,
                        "Gossip send failed, skipping peer this round"
                    );
                }
            }
        }
        if report.failed > 0 {
            self.send_failures
                .fetch_add(report.failed as u64, Ordering::Relaxed);
        }
        report
    }
}
