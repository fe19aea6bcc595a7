//! # BLS Signing Service
//!
//! Application service that implements [`BlsSigningApi`] for the local
//! identity and delegates curve work to the domain layer.
//!
//! The chain client is only consulted for registration status; it never
//! gates signing or aggregation.

use shared_types::NodeId;
use tracing::{debug, info, warn};

use crate::domain::bls;
use crate::domain::entities::{
    AggregateResult, BlsPublicKey, NodeIdentity, SignatureShare, SignedMessage,
};
use crate::domain::errors::SigningError;
use crate::ports::inbound::BlsSigningApi;
use crate::ports::outbound::{ChainClient, ChainClientError, ChainOperationResult};

/// Signing service bound to one node identity.
pub struct BlsSigningService<C: ChainClient> {
    identity: NodeIdentity,
    chain: C,
}

impl<C: ChainClient> BlsSigningService<C> {
    pub fn new(identity: NodeIdentity, chain: C) -> Self {
        info!(node_id = %identity.node_id().short(), "BLS signing service ready");
        Self { identity, chain }
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    /// Ask the registry whether the local key is registered.
    pub async fn is_registered(&self) -> Result<bool, ChainClientError> {
        self.chain.is_registered(&self.identity.node_id()).await
    }

    /// Registration status as a structured result.
    pub async fn registration_status(&self) -> ChainOperationResult {
        match self.is_registered().await {
            Ok(true) => ChainOperationResult::ok("registered", None),
            Ok(false) => ChainOperationResult::ok("not registered", None),
            Err(e) => {
                warn!(error = %e, "Registration status query failed");
                ChainOperationResult::failed(&e)
            }
        }
    }

    /// Register the local public key unless it already is.
    pub async fn register_on_chain(&self) -> ChainOperationResult {
        let node_id = self.identity.node_id();
        match self.chain.is_registered(&node_id).await {
            Ok(true) => return ChainOperationResult::ok("already registered", None),
            Ok(false) => {}
            Err(e) => {
                warn!(error = %e, "Registration pre-check failed");
                return ChainOperationResult::failed(&e);
            }
        }

        match self
            .chain
            .register_public_key(&node_id, self.identity.public_key())
            .await
        {
            Ok(tx_hash) => {
                info!(node_id = %node_id.short(), "Public key registered on-chain");
                ChainOperationResult::ok("registered", Some(tx_hash))
            }
            Err(e) => {
                warn!(error = %e, "Public key registration failed");
                ChainOperationResult::failed(&e)
            }
        }
    }
}

impl<C: ChainClient> BlsSigningApi for BlsSigningService<C> {
    fn node_id(&self) -> NodeId {
        self.identity.node_id()
    }

    fn public_key(&self) -> &BlsPublicKey {
        self.identity.public_key()
    }

    fn sign(&self, message: &[u8]) -> SignedMessage {
        let signature = bls::sign(message, self.identity.secret());
        debug!(len = message.len(), "Signed message");
        SignedMessage {
            node_id: self.identity.node_id(),
            signature,
            public_key: self.identity.public_key().clone(),
        }
    }

    fn aggregate(&self, shares: &[SignatureShare]) -> Result<AggregateResult, SigningError> {
        bls::aggregate(shares)
    }

    fn aggregate_for_message(
        &self,
        message: &[u8],
        shares: &[SignatureShare],
    ) -> Result<AggregateResult, SigningError> {
        bls::aggregate_for_message(message, shares)
    }

    fn verify(
        &self,
        message: &[u8],
        aggregate_signature: &[u8],
        aggregate_public_key: &[u8],
    ) -> Result<bool, SigningError> {
        bls::verify(message, aggregate_signature, aggregate_public_key)
    }
}
