//! Composition root: builds every service from a [`NodeConfig`].
//!
//! ## Initialization Order
//!
//! 1. Load or generate the node identity (state file)
//! 2. Bind the gossip socket and derive the advertised URL
//! 3. Build the signing service around the identity
//! 4. Build the membership service around the socket

use std::net::SocketAddr;
use std::sync::Arc;

use bn_01_bls_engine::{BlsSigningApi, BlsSigningService, UnconfiguredChainClient};
use bn_02_gossip_membership::{GossipService, SystemTimeSource, UdpTransport};
use shared_types::NodeId;
use tracing::info;

use crate::container::config::NodeConfig;
use crate::handlers::SigningHandler;
use crate::identity::IdentityStore;
use crate::RuntimeError;

/// Signing service as wired in the node. On-chain submission is external.
pub type SigningService = BlsSigningService<UnconfiguredChainClient>;

/// Membership service as wired in the node.
pub type GossipNode = GossipService<UdpTransport>;

/// All services of one node.
pub struct NodeContainer {
    pub config: NodeConfig,
    pub identity_store: IdentityStore,
    /// Registration flag as last recorded in the state file.
    pub registered: bool,
    pub signing: Arc<SigningHandler<SigningService>>,
    pub gossip: Arc<GossipNode>,
    pub transport: UdpTransport,
    pub local_addr: SocketAddr,
}

impl NodeContainer {
    pub async fn build(config: NodeConfig) -> Result<Self, RuntimeError> {
        let identity_store = IdentityStore::new(&config.identity.state_file);
        let (identity, state) = identity_store.load_or_create()?;
        let registered = state.registered;
        drop(state);

        let bind_addr = config.network.bind_addr;
        let transport = UdpTransport::bind(bind_addr)
            .await
            .map_err(|source| RuntimeError::Bind {
                addr: bind_addr,
                source,
            })?;
        let local_addr = transport.local_addr().map_err(|source| RuntimeError::Bind {
            addr: bind_addr,
            source,
        })?;
        let local_url = config.network.advertised_url(local_addr);

        let signing_service = Arc::new(BlsSigningService::new(identity, UnconfiguredChainClient));
        let node_id = signing_service.node_id();

        let gossip = GossipService::new(
            node_id,
            local_url.clone(),
            config.gossip.clone(),
            transport.clone(),
            Box::new(SystemTimeSource::new()),
        )?;

        info!(
            node_id = %node_id.short(),
            %local_addr,
            url = %local_url,
            "Node services initialized"
        );

        Ok(Self {
            config,
            identity_store,
            registered,
            signing: Arc::new(SigningHandler::new(signing_service)),
            gossip: Arc::new(gossip),
            transport,
            local_addr,
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.signing.api().node_id()
    }

    pub fn local_url(&self) -> &str {
        self.gossip.local_url()
    }
}
