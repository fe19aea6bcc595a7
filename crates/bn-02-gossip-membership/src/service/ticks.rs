//! Periodic activities. Each takes the state lock once, queues its sends,
//! and dispatches them after the lock is released.

use shared_types::NodeId;
use tracing::{debug, info};

use crate::domain::{GossipEnvelope, MemberUpdate, MessageType, PeerState};
use crate::ports::{GossipTransport, SweepReport, TickReport};
use crate::service::core::Outbox;
use crate::service::GossipService;

impl<T: GossipTransport> GossipService<T> {
    pub(crate) fn run_join(&self, seed_urls: &[String]) -> TickReport {
        let mut outbox = Outbox::new();
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let alive = self.self_update(state);
            let join = self.originate(state, MessageType::Join, &alive, self.config.max_ttl, Vec::new());
            for url in seed_urls.iter().filter(|u| **u != self.local_url) {
                outbox.push((url.clone(), GossipEnvelope::new(self.local_id, join.clone())));
            }
        }
        info!(seeds = outbox.len(), "Joining cluster");
        self.dispatch(outbox)
    }

    pub(crate) fn run_heartbeat(&self) -> TickReport {
        let mut outbox = Outbox::new();
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let targets = self.select_targets(state, &[]);
            if targets.is_empty() {
                return TickReport::default();
            }
            let alive = self.self_update(state);
            let heartbeat =
                self.originate(state, MessageType::Heartbeat, &alive, self.config.max_ttl, Vec::new());
            self.queue(&mut outbox, &targets, &heartbeat);
        }
        self.dispatch(outbox)
    }

    pub(crate) fn run_gossip(&self) -> TickReport {
        let mut outbox = Outbox::new();
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let targets = self.select_targets(state, &[]);
            if targets.is_empty() {
                return TickReport::default();
            }
            let recent = state.table.recently_changed(self.config.gossip_batch_size);
            for update in &recent {
                let message = self.originate(
                    state,
                    MessageType::for_state(update.state),
                    update,
                    self.config.max_ttl,
                    Vec::new(),
                );
                self.queue(&mut outbox, &targets, &message);
            }
            debug!(entries = recent.len(), targets = targets.len(), "Gossip round");
        }
        self.dispatch(outbox)
    }

    pub(crate) fn run_suspicion_sweep(&self) -> SweepReport {
        let now = self.now();
        let mut report = SweepReport::default();
        let mut outbox = Outbox::new();
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;

            for silent in state.table.silent_peers(now, self.config.suspicion_timeout_ms) {
                let suspect = MemberUpdate {
                    state: PeerState::Suspect,
                    ..silent
                };
                if !matches!(state.table.merge(&suspect, now), Ok(o) if o.changed()) {
                    continue;
                }
                info!(
                    peer_id = %suspect.peer_id.short(),
                    incarnation = suspect.incarnation,
                    "Peer suspected after missed heartbeats"
                );
                let message =
                    self.originate(state, MessageType::Suspect, &suspect, self.config.max_ttl, Vec::new());
                // The suspect itself is told so it can refute.
                let mut targets = self.select_targets(state, &[suspect.peer_id]);
                targets.push((suspect.peer_id, suspect.url.clone()));
                self.queue(&mut outbox, &targets, &message);
                report.suspected.push(suspect.peer_id);
            }

            for expired in state.table.expired_suspects(now, self.config.cleanup_timeout_ms) {
                let dead = MemberUpdate {
                    state: PeerState::Dead,
                    ..expired
                };
                if !matches!(state.table.merge(&dead, now), Ok(o) if o.changed()) {
                    continue;
                }
                info!(
                    peer_id = %dead.peer_id.short(),
                    incarnation = dead.incarnation,
                    "Peer declared dead"
                );
                let message =
                    self.originate(state, MessageType::Dead, &dead, self.config.max_ttl, Vec::new());
                // Told as well: a live peer that was cut off can still refute.
                let mut targets = self.select_targets(state, &[dead.peer_id]);
                targets.push((dead.peer_id, dead.url.clone()));
                self.queue(&mut outbox, &targets, &message);
                report.declared_dead.push(dead.peer_id);
            }
        }
        report.sends = self.dispatch(outbox);
        report
    }

    pub(crate) fn run_cleanup_sweep(&self) -> Vec<NodeId> {
        let now = self.now();
        let removed = self
            .state
            .lock()
            .table
            .remove_expired_dead(now, self.config.dead_grace_period_ms);
        for peer_id in &removed {
            info!(peer_id = %peer_id.short(), "Removed dead peer");
        }
        removed
    }

    pub(crate) fn run_leave(&self) -> TickReport {
        let mut outbox = Outbox::new();
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let targets = self.select_targets(state, &[]);
            let departing = MemberUpdate {
                state: PeerState::Dead,
                ..self.self_update(state)
            };
            let leave =
                self.originate(state, MessageType::Leave, &departing, self.config.max_ttl, Vec::new());
            self.queue(&mut outbox, &targets, &leave);
        }
        info!("Leaving cluster");
        self.dispatch(outbox)
    }
}
