//! # BLS Aggregation Node
//!
//! ## Startup Sequence
//!
//! 1. Load configuration from `BN_*` environment variables
//! 2. Initialize logging and metrics
//! 3. Load or generate the node identity, bind the gossip socket
//! 4. Start the gossip loops and join the seed peers
//! 5. Run until Ctrl+C, then announce `Leave` and stop

use anyhow::{Context, Result};
use node_runtime::{NodeConfig, NodeRuntime};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = NodeConfig::from_env().context("Failed to load configuration")?;

    bn_telemetry::init_telemetry(&config.telemetry).context("Failed to initialize telemetry")?;

    let mut runtime = NodeRuntime::new(config)
        .await
        .context("Failed to build node runtime")?;
    runtime.start().await;

    info!("Node is running. Press Ctrl+C to stop.");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for shutdown signal")?;

    runtime.shutdown().await;
    Ok(())
}
