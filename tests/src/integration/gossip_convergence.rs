//! # Membership Convergence
//!
//! Five simulated nodes driven by the shared clock:
//!
//! 1. Bootstrap through one seed until every node sees every other `Alive`
//! 2. A lossy, duplicating network followed by clean rounds
//! 3. A crashed node goes `Suspect -> Dead -> removed` everywhere and stays removed
//! 4. A partitioned node refutes its suspicion after the partition heals

#[cfg(test)]
mod tests {
    use bn_02_gossip_membership::{GossipApi, GossipConfig, PeerState};

    use crate::harness::{node_id, Cluster, LinkConditions};

    const NODES: usize = 5;

    fn bootstrapped(seed: u64) -> Cluster {
        let mut cluster = Cluster::new(NODES, GossipConfig::for_testing(), seed).unwrap();
        cluster.bootstrap(0);
        cluster
    }

    #[test]
    fn test_join_through_single_seed_converges() {
        let mut cluster = bootstrapped(7);

        // The seed learns every joiner directly.
        assert_eq!(cluster.view(0).len(), NODES - 1);

        assert!(cluster.settle(2_000, LinkConditions::PERFECT));
        for observer in 0..NODES {
            assert_eq!(cluster.view(observer).len(), NODES - 1);
            assert!(!cluster.view(observer).contains_key(&node_id(observer)));
        }
    }

    #[test]
    fn test_converges_after_lossy_phase() {
        let mut cluster = bootstrapped(11);
        assert!(cluster.settle(2_000, LinkConditions::PERFECT));

        cluster.run_for(800, LinkConditions::lossy(0.2, 0.2));
        assert!(cluster.settle(3_000, LinkConditions::PERFECT));

        // Duplicates were dropped somewhere along the way.
        let dropped: u64 = (0..NODES)
            .map(|i| cluster.service(i).stats().duplicates_dropped)
            .sum();
        assert!(dropped > 0);
    }

    #[test]
    fn test_crashed_node_is_suspected_declared_dead_and_removed() {
        let mut cluster = bootstrapped(23);
        assert!(cluster.settle(2_000, LinkConditions::PERFECT));
        let config = GossipConfig::for_testing();
        let crashed = NODES - 1;
        cluster.crash(crashed);

        cluster.run_for(config.suspicion_timeout_ms + 200, LinkConditions::PERFECT);
        for observer in cluster.live() {
            assert_eq!(cluster.state_at(observer, crashed), Some(PeerState::Suspect));
        }

        cluster.run_for(config.cleanup_timeout_ms + 200, LinkConditions::PERFECT);
        for observer in cluster.live() {
            assert_eq!(cluster.state_at(observer, crashed), Some(PeerState::Dead));
        }

        cluster.run_for(config.dead_grace_period_ms + 400, LinkConditions::PERFECT);
        for observer in cluster.live() {
            assert_eq!(cluster.state_at(observer, crashed), None);
        }

        // Late death notices from slower peers must not bring it back.
        cluster.run_for(2_000, LinkConditions::PERFECT);
        for observer in cluster.live() {
            assert_eq!(cluster.state_at(observer, crashed), None);
        }
        assert!(cluster.is_converged());
    }

    #[test]
    fn test_partitioned_node_refutes_after_heal() {
        let mut cluster = bootstrapped(31);
        assert!(cluster.settle(2_000, LinkConditions::PERFECT));
        let config = GossipConfig::for_testing();
        let isolated = NODES - 1;

        cluster.partition(&[isolated]);
        cluster.run_for(config.suspicion_timeout_ms + 300, LinkConditions::PERFECT);
        for observer in 0..isolated {
            assert_eq!(cluster.state_at(observer, isolated), Some(PeerState::Suspect));
        }
        assert_eq!(cluster.service(isolated).local_incarnation(), 0);

        // Heal well before the suspicion would turn into death.
        cluster.heal();
        assert!(cluster.settle(config.cleanup_timeout_ms / 2, LinkConditions::PERFECT));
        assert!(cluster.service(isolated).local_incarnation() > 0);
        assert_eq!(cluster.service(isolated).stats().alive, NODES - 1);
    }
}
