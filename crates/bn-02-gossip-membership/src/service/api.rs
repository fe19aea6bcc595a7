use std::sync::atomic::Ordering;

use shared_types::NodeId;

use crate::domain::{GossipEnvelope, PeerRecord};
use crate::ports::{GossipApi, GossipStats, GossipTransport, ReceiveOutcome, SweepReport, TickReport};
use crate::service::GossipService;

impl<T: GossipTransport> GossipApi for GossipService<T> {
    fn on_envelope(&self, envelope: GossipEnvelope) -> ReceiveOutcome {
        let (outcome, outbox) = self.process_envelope(envelope);
        self.dispatch(outbox);
        outcome
    }

    fn join(&self, seed_urls: &[String]) -> TickReport {
        self.run_join(seed_urls)
    }

    fn heartbeat_tick(&self) -> TickReport {
        self.run_heartbeat()
    }

    fn gossip_tick(&self) -> TickReport {
        self.run_gossip()
    }

    fn suspicion_sweep(&self) -> SweepReport {
        self.run_suspicion_sweep()
    }

    fn cleanup_sweep(&self) -> Vec<NodeId> {
        self.run_cleanup_sweep()
    }

    fn leave(&self) -> TickReport {
        self.run_leave()
    }

    fn list_peers(&self) -> Vec<PeerRecord> {
        self.state.lock().table.records()
    }

    fn stats(&self) -> GossipStats {
        let state = self.state.lock();
        let counts = state.table.counts();
        GossipStats {
            peer_count: state.table.len(),
            alive: counts.alive,
            suspect: counts.suspect,
            dead: counts.dead,
            messages_seen: state.messages_seen,
            messages_received: state.messages_received,
            duplicates_dropped: state.duplicates_dropped,
            messages_forwarded: state.messages_forwarded,
            send_failures: self.send_failures.load(Ordering::Relaxed),
            dedup_entries: state.dedup.len(),
            local_incarnation: state.incarnation,
        }
    }
}
