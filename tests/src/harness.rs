//! In-process cluster simulator.
//!
//! Every node is a real [`GossipService`] over an [`InMemoryTransport`].
//! All nodes share one [`ControllableTimeSource`], and nothing is delivered
//! until [`Cluster::pump`] drains the outboxes, so a test controls time,
//! loss, duplication and partitions exactly.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use bn_02_gossip_membership::test_utils::ControllableTimeSource;
use bn_02_gossip_membership::{
    GossipApi, GossipConfig, GossipError, GossipService, InMemoryTransport, PeerState,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use shared_types::NodeId;

/// Delivery waves per pump. Hop budgets quiesce real traffic long before this.
const MAX_WAVES: usize = 64;

const START_MILLIS: u64 = 1_000_000;

/// Per-datagram loss and duplication probabilities.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LinkConditions {
    pub loss: f64,
    pub duplication: f64,
}

impl LinkConditions {
    pub const PERFECT: Self = Self {
        loss: 0.0,
        duplication: 0.0,
    };

    pub fn lossy(loss: f64, duplication: f64) -> Self {
        Self { loss, duplication }
    }
}

/// Deterministic id for simulated node `index`.
pub fn node_id(index: usize) -> NodeId {
    let mut bytes = [0u8; 32];
    bytes[0] = 0xB0;
    bytes[1] = index as u8;
    NodeId::new(bytes)
}

pub fn node_url(index: usize) -> String {
    format!("mem://node-{index}")
}

/// One simulated member.
pub struct SimNode {
    pub id: NodeId,
    pub url: String,
    pub service: GossipService<Arc<InMemoryTransport>>,
    pub transport: Arc<InMemoryTransport>,
}

/// A set of gossip services wired together by the harness.
pub struct Cluster {
    pub nodes: Vec<SimNode>,
    pub clock: ControllableTimeSource,
    config: GossipConfig,
    rng: StdRng,
    crashed: HashSet<usize>,
    blocked: HashSet<(usize, usize)>,
    since_heartbeat: u64,
}

impl Cluster {
    /// `size` isolated nodes; `seed` fixes the harness's loss decisions.
    pub fn new(size: usize, config: GossipConfig, seed: u64) -> Result<Self, GossipError> {
        let clock = ControllableTimeSource::new(START_MILLIS);
        let nodes = (0..size)
            .map(|index| {
                let transport = Arc::new(InMemoryTransport::new());
                let service = GossipService::new(
                    node_id(index),
                    node_url(index),
                    config.clone(),
                    Arc::clone(&transport),
                    Box::new(clock.clone()),
                )?;
                Ok(SimNode {
                    id: node_id(index),
                    url: node_url(index),
                    service,
                    transport,
                })
            })
            .collect::<Result<Vec<_>, GossipError>>()?;

        Ok(Self {
            nodes,
            clock,
            config,
            rng: StdRng::seed_from_u64(seed),
            crashed: HashSet::new(),
            blocked: HashSet::new(),
            since_heartbeat: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn service(&self, index: usize) -> &GossipService<Arc<InMemoryTransport>> {
        &self.nodes[index].service
    }

    /// Every other node joins through `seed`, one at a time.
    pub fn bootstrap(&mut self, seed: usize) {
        let seeds = vec![node_url(seed)];
        for index in 0..self.nodes.len() {
            if index == seed {
                continue;
            }
            self.nodes[index].service.join(&seeds);
            self.pump(LinkConditions::PERFECT);
        }
    }

    /// Deliver queued envelopes, including the replies and relays they
    /// cause, until every outbox is empty. Returns the deliveries made.
    pub fn pump(&mut self, link: LinkConditions) -> usize {
        let mut delivered = 0;
        for _ in 0..MAX_WAVES {
            let mut wave = Vec::new();
            for (sender, node) in self.nodes.iter().enumerate() {
                wave.extend(
                    node.transport
                        .take_sent()
                        .into_iter()
                        .map(|(url, envelope)| (sender, url, envelope)),
                );
            }
            if wave.is_empty() {
                break;
            }

            for (sender, url, envelope) in wave {
                let Some(target) = self.index_of(&url) else {
                    continue;
                };
                if !self.link_up(sender, target) || self.rng.gen_bool(link.loss) {
                    continue;
                }
                let copies = if self.rng.gen_bool(link.duplication) { 2 } else { 1 };
                for _ in 0..copies {
                    self.nodes[target].service.on_envelope(envelope.clone());
                    delivered += 1;
                }
            }
        }
        delivered
    }

    /// Advance one gossip interval and run every live node's periodic work.
    pub fn round(&mut self, link: LinkConditions) {
        self.clock.advance(self.config.gossip_interval_ms);
        self.since_heartbeat += self.config.gossip_interval_ms;
        let heartbeat_due = self.since_heartbeat >= self.config.heartbeat_interval_ms;
        if heartbeat_due {
            self.since_heartbeat = 0;
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if self.crashed.contains(&index) {
                continue;
            }
            if heartbeat_due {
                node.service.heartbeat_tick();
            }
            node.service.gossip_tick();
            node.service.suspicion_sweep();
            node.service.cleanup_sweep();
        }
        self.pump(link);
    }

    /// Run rounds until `millis` of simulated time have passed.
    pub fn run_for(&mut self, millis: u64, link: LinkConditions) {
        let rounds = millis.div_ceil(self.config.gossip_interval_ms);
        for _ in 0..rounds {
            self.round(link);
        }
    }

    /// Stop a node: it neither ticks nor sends nor receives from now on.
    pub fn crash(&mut self, index: usize) {
        self.crashed.insert(index);
        self.nodes[index].transport.take_sent();
    }

    pub fn is_crashed(&self, index: usize) -> bool {
        self.crashed.contains(&index)
    }

    /// Cut every link between `group` and the remaining nodes.
    pub fn partition(&mut self, group: &[usize]) {
        for &inside in group {
            for outside in (0..self.nodes.len()).filter(|i| !group.contains(i)) {
                self.blocked.insert((inside, outside));
                self.blocked.insert((outside, inside));
            }
        }
    }

    pub fn heal(&mut self) {
        self.blocked.clear();
    }

    /// `observer`'s membership table as `peer -> (state, incarnation)`.
    pub fn view(&self, observer: usize) -> BTreeMap<NodeId, (PeerState, u64)> {
        self.nodes[observer]
            .service
            .list_peers()
            .into_iter()
            .map(|r| (r.peer_id, (r.state, r.incarnation)))
            .collect()
    }

    pub fn state_at(&self, observer: usize, subject: usize) -> Option<PeerState> {
        self.view(observer)
            .get(&node_id(subject))
            .map(|(state, _)| *state)
    }

    pub fn live(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|i| !self.crashed.contains(i))
            .collect()
    }

    /// Every live node sees every other live node `Alive` at that node's
    /// own current incarnation.
    pub fn is_converged(&self) -> bool {
        let live = self.live();
        live.iter().all(|&observer| {
            let view = self.view(observer);
            live.iter().filter(|&&s| s != observer).all(|&subject| {
                let expected = (
                    PeerState::Alive,
                    self.nodes[subject].service.local_incarnation(),
                );
                view.get(&node_id(subject)) == Some(&expected)
            })
        })
    }

    /// Run rounds until converged, giving up after `max_millis`.
    pub fn settle(&mut self, max_millis: u64, link: LinkConditions) -> bool {
        let mut elapsed = 0;
        while elapsed < max_millis {
            if self.is_converged() {
                return true;
            }
            self.round(link);
            elapsed += self.config.gossip_interval_ms;
        }
        self.is_converged()
    }

    fn index_of(&self, url: &str) -> Option<usize> {
        self.nodes.iter().position(|n| n.url == url)
    }

    fn link_up(&self, from: usize, to: usize) -> bool {
        !self.crashed.contains(&from)
            && !self.crashed.contains(&to)
            && !self.blocked.contains(&(from, to))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nodes_start_isolated() {
        let cluster = Cluster::new(3, GossipConfig::for_testing(), 1).unwrap();
        assert_eq!(cluster.len(), 3);
        assert!(cluster.view(0).is_empty());
        assert_eq!(cluster.service(2).local_url(), "mem://node-2");
    }

    #[test]
    fn test_full_loss_delivers_nothing() {
        let mut cluster = Cluster::new(2, GossipConfig::for_testing(), 1).unwrap();
        cluster.service(1).join(&[node_url(0)]);
        assert_eq!(cluster.pump(LinkConditions::lossy(1.0, 0.0)), 0);
        assert!(cluster.view(0).is_empty());
    }

    #[test]
    fn test_partition_blocks_both_directions() {
        let mut cluster = Cluster::new(3, GossipConfig::for_testing(), 1).unwrap();
        cluster.partition(&[2]);
        cluster.service(2).join(&[node_url(0)]);
        cluster.pump(LinkConditions::PERFECT);
        assert!(cluster.view(0).is_empty());

        cluster.heal();
        cluster.service(2).join(&[node_url(0)]);
        cluster.pump(LinkConditions::PERFECT);
        assert_eq!(cluster.state_at(0, 2), Some(PeerState::Alive));
        assert_eq!(cluster.state_at(2, 0), Some(PeerState::Alive));
    }
}
