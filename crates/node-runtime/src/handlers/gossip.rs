//! Drives the membership service: periodic ticks and the UDP receive loop.
//!
//! The service methods are synchronous and never wait on the network, so
//! both loops call them inline. Each loop exits when the shutdown channel
//! flips to `true`.

use std::sync::Arc;
use std::time::Duration;

use bn_02_gossip_membership::{GossipApi, GossipConfig, GossipStats, ReceiveOutcome, UdpTransport};
use bn_telemetry::{
    log_event, log_peer_event, metric_inc, set_peer_counts, GOSSIP_DECODE_FAILURES, GOSSIP_DUPLICATES_DROPPED,
    GOSSIP_LOCAL_INCARNATION, GOSSIP_MESSAGES_FORWARDED, GOSSIP_MESSAGES_RECEIVED,
    GOSSIP_SEND_FAILURES, SUBSYSTEM_ERRORS,
};
use tokio::sync::watch;
use tokio::time::{interval, Interval, MissedTickBehavior};
use tracing::{debug, info, trace};

/// Mirrors the service's cumulative counters into Prometheus.
#[derive(Debug, Default)]
pub struct StatsRecorder {
    last: GossipStats,
}

impl StatsRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the growth since the previous call and refresh the gauges.
    pub fn record(&mut self, stats: &GossipStats) {
        let last = &self.last;
        GOSSIP_MESSAGES_RECEIVED.inc_by(growth(stats.messages_received, last.messages_received));
        GOSSIP_DUPLICATES_DROPPED.inc_by(growth(stats.duplicates_dropped, last.duplicates_dropped));
        GOSSIP_MESSAGES_FORWARDED.inc_by(growth(stats.messages_forwarded, last.messages_forwarded));
        GOSSIP_SEND_FAILURES.inc_by(growth(stats.send_failures, last.send_failures));
        set_peer_counts(stats.alive, stats.suspect, stats.dead);
        GOSSIP_LOCAL_INCARNATION.set(stats.local_incarnation as f64);
        self.last = stats.clone();
    }
}

fn growth(now: u64, before: u64) -> f64 {
    now.saturating_sub(before) as f64
}

fn sweep<G: GossipApi + ?Sized>(gossip: &G) {
    let report = gossip.suspicion_sweep();
    for peer_id in &report.declared_dead {
        log_peer_event!(warn, "gossip", "Peer declared dead", peer_id.short());
    }
}

fn ticker(period_ms: u64) -> Interval {
    let mut ticker = interval(Duration::from_millis(period_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Run heartbeat, gossip, suspicion and cleanup activities until shutdown.
///
/// The suspicion sweep runs after every heartbeat and gossip tick; cleanup
/// and metric export run with the gossip tick.
pub async fn run_timers<G>(gossip: Arc<G>, config: GossipConfig, mut shutdown: watch::Receiver<bool>)
where
    G: GossipApi + ?Sized,
{
    let mut heartbeat = ticker(config.heartbeat_interval_ms);
    let mut dissemination = ticker(config.gossip_interval_ms);
    let mut recorder = StatsRecorder::new();

    info!(
        heartbeat_ms = config.heartbeat_interval_ms,
        gossip_ms = config.gossip_interval_ms,
        "Gossip timers started"
    );

    loop {
        tokio::select! {
            _ = heartbeat.tick() => {
                let report = gossip.heartbeat_tick();
                trace!(sent = report.sent, failed = report.failed, "Heartbeat tick");
                sweep(gossip.as_ref());
            }
            _ = dissemination.tick() => {
                gossip.gossip_tick();
                sweep(gossip.as_ref());
                for peer_id in gossip.cleanup_sweep() {
                    log_peer_event!(debug, "gossip", "Dead peer removed", peer_id.short());
                }
                recorder.record(&gossip.stats());
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    recorder.record(&gossip.stats());
    info!("Gossip timers stopped");
}

/// Feed inbound datagrams to the service until shutdown.
pub async fn run_receiver<G>(
    gossip: Arc<G>,
    transport: UdpTransport,
    mut shutdown: watch::Receiver<bool>,
) where
    G: GossipApi + ?Sized,
{
    info!("Gossip receiver started");
    loop {
        tokio::select! {
            received = transport.recv_envelope() => match received {
                Ok((_, Ok(envelope))) => {
                    if let ReceiveOutcome::Processed { refuted: true, .. } = gossip.on_envelope(envelope) {
                        debug!("Refuted suspicion of local node");
                    }
                }
                Ok((source, Err(e))) => {
                    metric_inc!(GOSSIP_DECODE_FAILURES);
                    log_event!(debug, "gossip", "Dropped undecodable datagram", source = %source, error = %e);
                }
                Err(e) => {
                    metric_inc!(SUBSYSTEM_ERRORS, &["gossip", "socket"]);
                    log_event!(warn, "gossip", "Socket receive failed", error = %e);
                }
            },
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    info!("Gossip receiver stopped");
}
