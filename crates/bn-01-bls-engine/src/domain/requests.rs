//! # Request and Response DTOs
//!
//! The hex surface exposed to the transport layer. Every byte field is
//! `0x`-prefixed hex of fixed width (compressed points); parsing happens
//! here, before any curve arithmetic.

use serde::{Deserialize, Serialize};
use shared_types::{decode_fixed_hex, encode_hex, NodeId};

use super::entities::{
    AggregateResult, SignatureShare, SignedMessage, PUBLIC_KEY_LEN, SIGNATURE_LEN,
};
use super::errors::SigningError;

/// `sign(message)` input. The message is signed as UTF-8 bytes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    pub message: String,
}

/// `sign(message)` output.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignResponse {
    pub node_id: String,
    pub signature: String,
    pub public_key: String,
}

impl From<&SignedMessage> for SignResponse {
    fn from(signed: &SignedMessage) -> Self {
        Self {
            node_id: signed.node_id.to_hex(),
            signature: encode_hex(&signed.signature.to_bytes()),
            public_key: encode_hex(&signed.public_key.to_bytes()),
        }
    }
}

/// One `{nodeId, signature, publicKey}` triple as received over the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareInput {
    pub node_id: String,
    pub signature: String,
    pub public_key: String,
}

impl ShareInput {
    /// Decode hex fields into a share. Only checks syntax and length.
    pub fn parse(&self) -> Result<SignatureShare, SigningError> {
        let node_id: NodeId = self.node_id.parse()?;
        let signature = decode_fixed_hex::<SIGNATURE_LEN>("signature", &self.signature)?;
        let public_key = decode_fixed_hex::<PUBLIC_KEY_LEN>("publicKey", &self.public_key)?;
        Ok(SignatureShare {
            node_id,
            signature,
            public_key,
        })
    }
}

impl From<&SignResponse> for ShareInput {
    fn from(response: &SignResponse) -> Self {
        Self {
            node_id: response.node_id.clone(),
            signature: response.signature.clone(),
            public_key: response.public_key.clone(),
        }
    }
}

/// `aggregate(shares)` input.
///
/// When `message` is present the aggregate is verified against it and the
/// response carries the encoded message point.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRequest {
    pub shares: Vec<ShareInput>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AggregateRequest {
    /// Parse every share, failing on the first malformed one.
    pub fn parse_shares(&self) -> Result<Vec<SignatureShare>, SigningError> {
        self.shares
            .iter()
            .enumerate()
            .map(|(index, share)| {
                share
                    .parse()
                    .map_err(|e| SigningError::Validation(format!("share {index}: {e}")))
            })
            .collect()
    }
}

/// `aggregate(shares)` output. Points are EIP-2537 encoded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResponse {
    pub node_ids: Vec<String>,
    pub aggregate_signature: String,
    pub aggregate_public_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_point: Option<String>,
}

impl From<&AggregateResult> for AggregateResponse {
    fn from(result: &AggregateResult) -> Self {
        Self {
            node_ids: result.node_ids.iter().map(NodeId::to_hex).collect(),
            aggregate_signature: encode_hex(&result.aggregate_signature),
            aggregate_public_key: encode_hex(&result.aggregate_public_key),
            message_point: result.message_point.as_ref().map(|p| encode_hex(p)),
        }
    }
}
