//! Runtime tests over real loopback sockets.

use std::time::Duration;

use bn_02_gossip_membership::{GossipApi, GossipConfig, PeerState};
use node_runtime::{NodeConfig, NodeContainer, NodeRuntime};
use shared_types::NodeId;
use tempfile::TempDir;

fn node_config(dir: &TempDir, name: &str, seeds: Vec<String>) -> NodeConfig {
    let mut config = NodeConfig::default();
    config.network.bind_addr = "127.0.0.1:0".parse().unwrap();
    config.network.seed_peers = seeds;
    config.gossip = GossipConfig::for_testing();
    config.identity.state_file = dir.path().join(format!("{name}.json"));
    config
}

fn peer_state(container: &NodeContainer, peer: NodeId) -> Option<PeerState> {
    container
        .gossip
        .list_peers()
        .into_iter()
        .find(|r| r.peer_id == peer)
        .map(|r| r.state)
}

async fn eventually(check: impl Fn() -> bool) -> bool {
    for _ in 0..150 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    false
}

#[tokio::test]
async fn test_two_nodes_discover_each_other_and_leave() {
    let dir = tempfile::tempdir().unwrap();

    let mut a = NodeRuntime::new(node_config(&dir, "a", Vec::new()))
        .await
        .unwrap();
    a.start().await;
    let node_a = a.container();

    let mut b = NodeRuntime::new(node_config(&dir, "b", vec![node_a.local_url().to_string()]))
        .await
        .unwrap();
    b.start().await;
    let node_b = b.container();

    assert!(eventually(|| peer_state(&node_a, node_b.node_id()) == Some(PeerState::Alive)).await);
    assert!(eventually(|| peer_state(&node_b, node_a.node_id()) == Some(PeerState::Alive)).await);

    b.shutdown().await;
    assert!(eventually(|| peer_state(&node_a, node_b.node_id()) == Some(PeerState::Dead)).await);

    a.shutdown().await;
}

#[tokio::test]
async fn test_identity_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    let first = NodeRuntime::new(node_config(&dir, "a", Vec::new()))
        .await
        .unwrap();
    let node_id = first.container().node_id();
    first.shutdown().await;

    let second = NodeRuntime::new(node_config(&dir, "a", Vec::new()))
        .await
        .unwrap();
    assert_eq!(second.container().node_id(), node_id);
    second.shutdown().await;
}
