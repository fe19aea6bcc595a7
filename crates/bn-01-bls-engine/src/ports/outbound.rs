//! # Outbound Ports (Driven Ports / SPI)
//!
//! The on-chain registry the service consults for registration status.

use serde::{Deserialize, Serialize};
use shared_types::{encode_hex, NodeId, TxHash};
use thiserror::Error;

use crate::domain::entities::BlsPublicKey;

/// Error from the chain client.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChainClientError {
    /// Transport or node-side RPC failure.
    #[error("RPC error: {0}")]
    Rpc(String),

    /// The transaction was mined but reverted.
    #[error("Transaction reverted: {0}")]
    Reverted(String),

    /// No registry contract or signer is configured.
    #[error("Chain client not configured")]
    NotConfigured,
}

/// Structured outcome returned to callers of chain operations.
///
/// Failures are reported, never swallowed, and never retried here.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainOperationResult {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
}

impl ChainOperationResult {
    pub fn ok(message: impl Into<String>, tx_hash: Option<TxHash>) -> Self {
        Self {
            success: true,
            message: message.into(),
            tx_hash: tx_hash.map(|h| encode_hex(&h)),
        }
    }

    pub fn failed(error: &ChainClientError) -> Self {
        Self {
            success: false,
            message: error.to_string(),
            tx_hash: None,
        }
    }
}

/// Gateway to the on-chain public key registry.
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync {
    /// Whether `node_id` has a registered public key.
    async fn is_registered(&self, node_id: &NodeId) -> Result<bool, ChainClientError>;

    /// Register `public_key` for `node_id`, returning the transaction hash.
    async fn register_public_key(
        &self,
        node_id: &NodeId,
        public_key: &BlsPublicKey,
    ) -> Result<TxHash, ChainClientError>;
}
