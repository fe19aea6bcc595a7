use tracing::{debug, info};

use crate::domain::{
    GossipEnvelope, GossipMessage, MemberUpdate, MergeOutcome, MessageType, PeerState, Timestamp,
};
use crate::ports::{GossipTransport, ReceiveOutcome};
use crate::service::core::{GossipState, Outbox};
use crate::service::GossipService;

impl<T: GossipTransport> GossipService<T> {
    /// Dedup, merge, reply and forward one envelope. Sends are returned, not performed.
    pub(crate) fn process_envelope(&self, envelope: GossipEnvelope) -> (ReceiveOutcome, Outbox) {
        let GossipEnvelope { from, message } = envelope;
        let now = self.now();
        let mut outbox = Outbox::new();

        let mut guard = self.state.lock();
        let state = &mut *guard;

        if !state.dedup.record(message.message_id) {
            state.duplicates_dropped += 1;
            debug!(message_id = %message.message_id, "Dropped duplicate gossip message");
            return (ReceiveOutcome::Duplicate, outbox);
        }
        state.messages_seen += 1;
        state.messages_received += 1;

        let mut refuted = false;
        let merge = self.apply_update(state, &message.update(), now, &mut outbox, &mut refuted);

        let direct = message.origin_id == message.payload.subject;
        if direct && message.message_type.implied_state() == PeerState::Alive {
            state
                .table
                .refresh_heartbeat(&message.payload.subject, message.incarnation, now);
        }

        for entry in &message.payload.snapshot {
            self.apply_update(state, entry, now, &mut outbox, &mut refuted);
        }

        if direct && from == message.origin_id && message.origin_id != self.local_id {
            if message.message_type == MessageType::Join {
                self.queue_join_reply(state, &message, &mut outbox);
            } else if message.message_type.implied_state() == PeerState::Alive {
                self.queue_correction(state, &message, &mut outbox);
            }
        }

        let forwarded = self.queue_forward(state, &message, from, &mut outbox);

        (
            ReceiveOutcome::Processed {
                merge,
                refuted,
                forwarded,
            },
            outbox,
        )
    }

    /// Merge one claim, or refute it if it names this node.
    pub(crate) fn apply_update(
        &self,
        state: &mut GossipState,
        update: &MemberUpdate,
        now: Timestamp,
        outbox: &mut Outbox,
        refuted: &mut bool,
    ) -> Option<MergeOutcome> {
        if update.peer_id == self.local_id {
            if update.state != PeerState::Alive && update.incarnation >= state.incarnation {
                self.refute(state, update, outbox);
                *refuted = true;
            }
            return None;
        }

        // Unknown and dead is the same as removed; re-inserting would undo cleanup.
        if update.state == PeerState::Dead && state.table.get(&update.peer_id).is_none() {
            debug!(peer_id = %update.peer_id.short(), "Ignoring death of unknown peer");
            return Some(MergeOutcome::Ignored);
        }

        match state.table.merge(update, now) {
            Ok(outcome) => {
                if let MergeOutcome::Updated { previous } = outcome {
                    if previous != update.state {
                        info!(
                            peer_id = %update.peer_id.short(),
                            from = %previous,
                            to = %update.state,
                            incarnation = update.incarnation,
                            "Peer state changed"
                        );
                    }
                } else if outcome == MergeOutcome::Inserted {
                    info!(
                        peer_id = %update.peer_id.short(),
                        state = %update.state,
                        "Peer discovered"
                    );
                }
                Some(outcome)
            }
            Err(e) => {
                debug!(peer_id = %update.peer_id.short(), error = %e, "Update rejected");
                None
            }
        }
    }

    /// Raise own incarnation above the claim and announce `Alive`.
    fn refute(&self, state: &mut GossipState, claim: &MemberUpdate, outbox: &mut Outbox) {
        state.incarnation = claim.incarnation.max(state.incarnation) + 1;
        info!(
            claimed = %claim.state,
            incarnation = state.incarnation,
            "Refuting suspicion of local node"
        );
        let alive = self.self_update(state);
        let message = self.originate(state, MessageType::Heartbeat, &alive, self.config.max_ttl, Vec::new());
        let targets = self.select_targets(state, &[]);
        self.queue(outbox, &targets, &message);
    }

    /// Reply to a joiner with a full snapshot; the reply is not relayed.
    ///
    /// If the join lost to a stored `Suspect` or `Dead` record, that record
    /// is included so the joiner can refute it.
    fn queue_join_reply(&self, state: &mut GossipState, join: &GossipMessage, outbox: &mut Outbox) {
        let mut snapshot = state.table.snapshot(Some(&join.payload.subject));
        if let Some(record) = state.table.get(&join.payload.subject) {
            if !record.is_alive() {
                snapshot.push(record.to_update());
            }
        }
        let alive = self.self_update(state);
        let reply = self.originate(state, MessageType::Heartbeat, &alive, 0, snapshot);
        debug!(
            joiner = %join.payload.subject.short(),
            entries = reply.payload.snapshot.len(),
            "Sending join snapshot"
        );
        outbox.push((
            join.payload.url.clone(),
            GossipEnvelope::new(self.local_id, reply),
        ));
    }

    /// Tell a peer heartbeating below our record of it that it is held
    /// `Suspect` or `Dead`, so it can raise its incarnation.
    fn queue_correction(&self, state: &mut GossipState, message: &GossipMessage, outbox: &mut Outbox) {
        let Some(record) = state.table.get(&message.payload.subject) else {
            return;
        };
        if record.is_alive() {
            return;
        }
        let stored = record.to_update();
        debug!(
            peer_id = %stored.peer_id.short(),
            state = %stored.state,
            incarnation = stored.incarnation,
            "Correcting stale heartbeat"
        );
        let notice = self.originate(state, MessageType::for_state(stored.state), &stored, 0, Vec::new());
        outbox.push((
            message.payload.url.clone(),
            GossipEnvelope::new(self.local_id, notice),
        ));
    }

    /// Relay with one hop spent, excluding the sender and the origin.
    fn queue_forward(
        &self,
        state: &mut GossipState,
        message: &GossipMessage,
        from: shared_types::NodeId,
        outbox: &mut Outbox,
    ) -> usize {
        let relayed = message.relayed();
        if relayed.ttl == 0 {
            return 0;
        }
        let targets = self.select_targets(state, &[from, message.origin_id]);
        self.queue(outbox, &targets, &relayed);
        state.messages_forwarded += targets.len() as u64;
        targets.len()
    }
}
