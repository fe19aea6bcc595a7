//! In-process chain clients.

use std::collections::HashMap;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use shared_types::{NodeId, TxHash};

use crate::domain::entities::{BlsPublicKey, PUBLIC_KEY_LEN};
use crate::ports::outbound::{ChainClient, ChainClientError};

/// Registry held in memory. Used in tests and single-node development.
#[derive(Default)]
pub struct InMemoryChainClient {
    registry: Mutex<HashMap<NodeId, [u8; PUBLIC_KEY_LEN]>>,
    next_failure: Mutex<Option<ChainClientError>>,
}

impl InMemoryChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next call fail with `error`.
    pub fn fail_next_with(&self, error: ChainClientError) {
        *self.next_failure.lock() = Some(error);
    }

    /// Registered key for `node_id`, if any.
    pub fn registered_key(&self, node_id: &NodeId) -> Option<[u8; PUBLIC_KEY_LEN]> {
        self.registry.lock().get(node_id).copied()
    }

    fn take_failure(&self) -> Result<(), ChainClientError> {
        match self.next_failure.lock().take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl ChainClient for InMemoryChainClient {
    async fn is_registered(&self, node_id: &NodeId) -> Result<bool, ChainClientError> {
        self.take_failure()?;
        Ok(self.registry.lock().contains_key(node_id))
    }

    async fn register_public_key(
        &self,
        node_id: &NodeId,
        public_key: &BlsPublicKey,
    ) -> Result<TxHash, ChainClientError> {
        self.take_failure()?;
        let key = public_key.to_bytes();
        let mut registry = self.registry.lock();
        if registry.contains_key(node_id) {
            return Err(ChainClientError::Reverted("node already registered".into()));
        }
        registry.insert(*node_id, key);

        let mut hasher = Sha256::new();
        hasher.update(node_id.as_bytes());
        hasher.update(key);
        Ok(hasher.finalize().into())
    }
}

/// Client for deployments without a registry contract. Every call fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredChainClient;

#[async_trait::async_trait]
impl ChainClient for UnconfiguredChainClient {
    async fn is_registered(&self, _node_id: &NodeId) -> Result<bool, ChainClientError> {
        Err(ChainClientError::NotConfigured)
    }

    async fn register_public_key(
        &self,
        _node_id: &NodeId,
        _public_key: &BlsPublicKey,
    ) -> Result<TxHash, ChainClientError> {
        Err(ChainClientError::NotConfigured)
    }
}
