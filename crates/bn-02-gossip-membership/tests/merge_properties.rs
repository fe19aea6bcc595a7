//! Property tests for the membership merge rule and the dedup cache.

use bn_02_gossip_membership::{DedupCache, MemberUpdate, MembershipTable, MessageId, PeerState, Timestamp};
use proptest::prelude::*;
use shared_types::NodeId;

fn node(v: u8) -> NodeId {
    let mut bytes = [0u8; 32];
    bytes[0] = v;
    NodeId::new(bytes)
}

fn state_strategy() -> impl Strategy<Value = PeerState> {
    prop_oneof![
        Just(PeerState::Alive),
        Just(PeerState::Suspect),
        Just(PeerState::Dead),
    ]
}

fn claims_strategy() -> impl Strategy<Value = Vec<(u8, u64, PeerState)>> {
    prop::collection::vec((0u8..4, 0u64..6, state_strategy()), 1..40)
}

/// A claim list paired with a shuffled copy of itself.
fn claims_with_permutation(
) -> impl Strategy<Value = (Vec<(u8, u64, PeerState)>, Vec<(u8, u64, PeerState)>)> {
    claims_strategy().prop_flat_map(|claims| (Just(claims.clone()), Just(claims).prop_shuffle()))
}

fn apply_all(claims: &[(u8, u64, PeerState)]) -> Vec<(NodeId, u64, PeerState)> {
    let mut table = MembershipTable::new(16);
    for (i, (peer, inc, state)) in claims.iter().enumerate() {
        let update = MemberUpdate::new(node(*peer), format!("mem://node-{peer}"), *inc, *state);
        table.merge(&update, Timestamp::new(i as u64)).unwrap();
    }
    table
        .records()
        .into_iter()
        .map(|r| (r.peer_id, r.incarnation, r.state))
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_merge_is_order_independent((claims, shuffled) in claims_with_permutation()) {
        prop_assert_eq!(apply_all(&claims), apply_all(&shuffled));
    }

    #[test]
    fn prop_merge_keeps_greatest_claim(claims in claims_strategy()) {
        let merged = apply_all(&claims);
        for (peer_id, inc, state) in merged {
            let best = claims
                .iter()
                .filter(|(p, _, _)| node(*p) == peer_id)
                .map(|(_, i, s)| (*i, *s))
                .max()
                .unwrap();
            prop_assert_eq!((inc, state), best);
        }
    }

    #[test]
    fn prop_table_never_exceeds_capacity(
        claims in prop::collection::vec((0u8..32, 0u64..3, state_strategy()), 1..80),
        max_peers in 1usize..8,
    ) {
        let mut table = MembershipTable::new(max_peers);
        for (i, (peer, inc, state)) in claims.iter().enumerate() {
            let update = MemberUpdate::new(node(*peer), "mem://peer", *inc, *state);
            let _ = table.merge(&update, Timestamp::new(i as u64));
            prop_assert!(table.len() <= max_peers);
        }
    }

    #[test]
    fn prop_dedup_remembers_most_recent(ids in prop::collection::vec(any::<u8>(), 1..100), capacity in 1usize..16) {
        let mut cache = DedupCache::new(capacity);
        let mut order: Vec<u8> = Vec::new();
        for id in &ids {
            let fresh = cache.record(MessageId::new([*id; 32]));
            prop_assert_eq!(fresh, !order.contains(id));
            if fresh {
                order.push(*id);
                if order.len() > capacity {
                    order.remove(0);
                }
            }
            prop_assert!(cache.len() <= capacity);
        }
        for id in &order {
            prop_assert!(cache.seen(&MessageId::new([*id; 32])));
        }
    }
}
