//! # Inbound Ports (Driving Ports / API)
//!
//! The signing surface exposed to the transport layer.

use shared_types::NodeId;

use crate::domain::entities::{AggregateResult, BlsPublicKey, SignatureShare, SignedMessage};
use crate::domain::errors::SigningError;
use crate::domain::requests::{AggregateRequest, AggregateResponse, SignRequest, SignResponse};

/// Primary BLS signing API.
///
/// Pure computation; implementations must be `Send + Sync` so requests can
/// run in parallel without coordination.
pub trait BlsSigningApi: Send + Sync {
    /// The local node's identifier.
    fn node_id(&self) -> NodeId;

    /// The local node's public key.
    fn public_key(&self) -> &BlsPublicKey;

    /// Sign `message` with the local key.
    fn sign(&self, message: &[u8]) -> SignedMessage;

    /// Aggregate externally supplied shares.
    ///
    /// # Errors
    /// * `EmptyInput` - no shares
    /// * `InvalidPoint` - a share fails curve or subgroup validation
    fn aggregate(&self, shares: &[SignatureShare]) -> Result<AggregateResult, SigningError>;

    /// Aggregate shares over a common message and verify before returning.
    fn aggregate_for_message(
        &self,
        message: &[u8],
        shares: &[SignatureShare],
    ) -> Result<AggregateResult, SigningError>;

    /// Verify an EIP-2537 encoded aggregate against a message.
    fn verify(
        &self,
        message: &[u8],
        aggregate_signature: &[u8],
        aggregate_public_key: &[u8],
    ) -> Result<bool, SigningError>;

    /// Hex-surface `sign`.
    fn handle_sign(&self, request: &SignRequest) -> SignResponse {
        SignResponse::from(&self.sign(request.message.as_bytes()))
    }

    /// Hex-surface `aggregate`. Validation errors surface before any curve arithmetic.
    fn handle_aggregate(
        &self,
        request: &AggregateRequest,
    ) -> Result<AggregateResponse, SigningError> {
        let shares = request.parse_shares()?;
        let result = match &request.message {
            Some(message) => self.aggregate_for_message(message.as_bytes(), &shares)?,
            None => self.aggregate(&shares)?,
        };
        Ok(AggregateResponse::from(&result))
    }
}
