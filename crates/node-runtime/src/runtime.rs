//! The node runtime: starts the gossip loops and stops them on shutdown.

use std::sync::Arc;
use std::time::Duration;

use bn_02_gossip_membership::GossipApi;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::container::{NodeConfig, NodeContainer};
use crate::handlers::gossip::{run_receiver, run_timers};
use crate::RuntimeError;

/// Time allowed for the loops to observe the shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// The main node runtime.
pub struct NodeRuntime {
    container: Arc<NodeContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl NodeRuntime {
    /// Build every service; nothing runs until [`start`](Self::start).
    pub async fn new(config: NodeConfig) -> Result<Self, RuntimeError> {
        let container = Arc::new(NodeContainer::build(config).await?);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Ok(Self {
            container,
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        })
    }

    /// ## Startup Sequence
    ///
    /// 1. Report on-chain registration status
    /// 2. Start the receive loop and the timers
    /// 3. Send `Join` to the seed peers
    pub async fn start(&mut self) {
        let container = &self.container;
        info!("===========================================");
        info!("  BLS Aggregation Node v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(node_id = %container.node_id(), url = %container.local_url(), "Node identity");

        let status = container.signing.api().registration_status().await;
        if status.success {
            info!(status = %status.message, recorded = container.registered, "On-chain registration");
        } else {
            warn!(error = %status.message, recorded = container.registered, "On-chain registration status unavailable");
        }

        self.tasks.push(tokio::spawn(run_receiver(
            Arc::clone(&container.gossip),
            container.transport.clone(),
            self.shutdown_rx.clone(),
        )));
        self.tasks.push(tokio::spawn(run_timers(
            Arc::clone(&container.gossip),
            container.config.gossip.clone(),
            self.shutdown_rx.clone(),
        )));

        let seeds = &container.config.network.seed_peers;
        if seeds.is_empty() {
            info!("No seed peers configured; waiting to be contacted");
        } else {
            let report = container.gossip.join(seeds);
            if report.failed > 0 {
                warn!(failed = report.failed, "Some seed peers were unreachable");
            }
        }
    }

    /// ## Shutdown Sequence
    ///
    /// 1. Announce `Leave` to the cluster
    /// 2. Signal the loops to stop
    /// 3. Wait for them, up to a grace period
    pub async fn shutdown(mut self) {
        info!("Initiating graceful shutdown...");
        self.container.gossip.leave();

        if let Err(e) = self.shutdown_tx.send(true) {
            error!("Failed to send shutdown signal: {}", e);
        }

        for task in self.tasks.drain(..) {
            match tokio::time::timeout(SHUTDOWN_GRACE, task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!(error = %e, "Runtime task ended abnormally"),
                Err(_) => warn!("Runtime task did not stop within the grace period"),
            }
        }
        info!("Shutdown complete");
    }

    pub fn container(&self) -> Arc<NodeContainer> {
        Arc::clone(&self.container)
    }
}
