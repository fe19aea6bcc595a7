//! # Domain Entities
//!
//! Key material, signature shares and aggregation results.
//!
//! Public keys live in G1 (48 bytes compressed) and signatures in G2
//! (96 bytes compressed): the min-pubkey-size configuration.

use blst::min_pk::{PublicKey, SecretKey, Signature};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use shared_types::NodeId;
use std::fmt;
use zeroize::Zeroizing;

use super::codec::{self, G1_ENCODED_LEN, G2_ENCODED_LEN};
use super::errors::SigningError;

/// Compressed G1 public key length.
pub const PUBLIC_KEY_LEN: usize = 48;

/// Compressed G2 signature length.
pub const SIGNATURE_LEN: usize = 96;

/// Secret scalar length.
pub const SECRET_KEY_LEN: usize = 32;

// =============================================================================
// Key material
// =============================================================================

/// BLS secret scalar. Never leaves the process; zeroized on drop by blst.
///
/// Not `Clone`: there is exactly one copy, owned by its [`NodeIdentity`].
pub struct BlsSecretKey(SecretKey);

impl BlsSecretKey {
    /// Generate a fresh key from 32 bytes of OS randomness.
    pub fn generate() -> Self {
        let mut ikm = Zeroizing::new([0u8; 32]);
        rand::thread_rng().fill_bytes(ikm.as_mut());
        // key_gen only fails for IKM shorter than 32 bytes.
        match SecretKey::key_gen(ikm.as_ref(), &[]) {
            Ok(sk) => Self(sk),
            Err(_) => unreachable!("32-byte IKM is always accepted"),
        }
    }

    /// Load a big-endian scalar. Rejects zero and values >= the group order.
    pub fn from_bytes(bytes: &[u8; SECRET_KEY_LEN]) -> Result<Self, SigningError> {
        SecretKey::from_bytes(bytes)
            .map(Self)
            .map_err(|_| SigningError::InvalidSecretKey)
    }

    /// Export the scalar. The buffer is wiped when dropped.
    pub fn to_bytes(&self) -> Zeroizing<[u8; SECRET_KEY_LEN]> {
        Zeroizing::new(self.0.to_bytes())
    }

    pub(crate) fn inner(&self) -> &SecretKey {
        &self.0
    }
}

impl fmt::Debug for BlsSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlsSecretKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// BLS public key (G1 point).
#[derive(Clone, Debug)]
pub struct BlsPublicKey(PublicKey);

impl PartialEq for BlsPublicKey {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BlsPublicKey {}

impl BlsPublicKey {
    /// Parse a compressed key, enforcing on-curve, subgroup and non-identity checks.
    pub fn from_bytes(bytes: &[u8; PUBLIC_KEY_LEN]) -> Result<Self, SigningError> {
        PublicKey::key_validate(bytes)
            .map(Self)
            .map_err(|e| SigningError::InvalidPoint {
                index: 0,
                field: "publicKey",
                reason: format!("{e:?}"),
            })
    }

    /// 48-byte compressed form.
    pub fn to_bytes(&self) -> [u8; PUBLIC_KEY_LEN] {
        self.0.to_bytes()
    }

    /// 128-byte EIP-2537 form for contract calldata.
    pub fn to_eip2537(&self) -> [u8; G1_ENCODED_LEN] {
        codec::encode_g1(self)
    }

    pub(crate) fn from_point(point: PublicKey) -> Self {
        Self(point)
    }

    pub(crate) fn point(&self) -> &PublicKey {
        &self.0
    }
}

/// BLS signature (G2 point).
#[derive(Clone, Debug)]
pub struct BlsSignature(Signature);

impl PartialEq for BlsSignature {
    fn eq(&self, other: &Self) -> bool {
        self.to_bytes() == other.to_bytes()
    }
}

impl Eq for BlsSignature {}

impl BlsSignature {
    /// Parse a compressed signature, enforcing on-curve, subgroup and non-identity checks.
    pub fn from_bytes(bytes: &[u8; SIGNATURE_LEN]) -> Result<Self, SigningError> {
        Signature::sig_validate(bytes, true)
            .map(Self)
            .map_err(|e| SigningError::InvalidPoint {
                index: 0,
                field: "signature",
                reason: format!("{e:?}"),
            })
    }

    /// 96-byte compressed form.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_LEN] {
        self.0.to_bytes()
    }

    /// 256-byte EIP-2537 form for contract calldata.
    pub fn to_eip2537(&self) -> [u8; G2_ENCODED_LEN] {
        codec::encode_g2(self)
    }

    pub(crate) fn from_point(point: Signature) -> Self {
        Self(point)
    }

    pub(crate) fn point(&self) -> &Signature {
        &self.0
    }
}

// =============================================================================
// Node identity
// =============================================================================

/// The local signing identity: created once at provisioning.
///
/// The public key is derived from the secret and cached. Not `Clone`; share
/// it by reference.
#[derive(Debug)]
pub struct NodeIdentity {
    node_id: NodeId,
    secret: BlsSecretKey,
    public_key: BlsPublicKey,
}

impl NodeIdentity {
    /// Generate a new identity; the node id is SHA-256 of the compressed public key.
    pub fn generate() -> Self {
        let secret = BlsSecretKey::generate();
        let public_key = super::bls::derive_public_key(&secret);
        let node_id = NodeId::from_key_material(&public_key.to_bytes());
        Self {
            node_id,
            secret,
            public_key,
        }
    }

    /// Build an identity from a secret scalar, deriving the node id from the key.
    pub fn from_secret_bytes(secret_bytes: &[u8; SECRET_KEY_LEN]) -> Result<Self, SigningError> {
        let secret = BlsSecretKey::from_bytes(secret_bytes)?;
        let public_key = super::bls::derive_public_key(&secret);
        let node_id = NodeId::from_key_material(&public_key.to_bytes());
        Ok(Self {
            node_id,
            secret,
            public_key,
        })
    }

    /// Rebuild an identity from a stored node id and secret scalar.
    pub fn from_parts(
        node_id: NodeId,
        secret_bytes: &[u8; SECRET_KEY_LEN],
    ) -> Result<Self, SigningError> {
        let secret = BlsSecretKey::from_bytes(secret_bytes)?;
        let public_key = super::bls::derive_public_key(&secret);
        Ok(Self {
            node_id,
            secret,
            public_key,
        })
    }

    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    pub fn public_key(&self) -> &BlsPublicKey {
        &self.public_key
    }

    pub fn secret(&self) -> &BlsSecretKey {
        &self.secret
    }
}

// =============================================================================
// Aggregation types
// =============================================================================

/// One node's contribution to an aggregate, as raw compressed bytes.
///
/// Points are decoded and subgroup-checked only inside aggregation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureShare {
    pub node_id: NodeId,
    #[serde(with = "shared_types::hex_bytes")]
    pub signature: [u8; SIGNATURE_LEN],
    #[serde(with = "shared_types::hex_bytes")]
    pub public_key: [u8; PUBLIC_KEY_LEN],
}

impl SignatureShare {
    pub fn new(
        node_id: NodeId,
        signature: &BlsSignature,
        public_key: &BlsPublicKey,
    ) -> Self {
        Self {
            node_id,
            signature: signature.to_bytes(),
            public_key: public_key.to_bytes(),
        }
    }
}

/// Output of a successful aggregation.
///
/// `node_ids` keeps input order. Both points are EIP-2537 encoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AggregateResult {
    pub node_ids: Vec<NodeId>,
    pub aggregate_signature: [u8; G2_ENCODED_LEN],
    pub aggregate_public_key: [u8; G1_ENCODED_LEN],
    /// EIP-2537 encoding of H(message); set only for message-bound aggregation.
    pub message_point: Option<[u8; G2_ENCODED_LEN]>,
}

/// A signature produced by the local identity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignedMessage {
    pub node_id: NodeId,
    pub signature: BlsSignature,
    pub public_key: BlsPublicKey,
}

impl SignedMessage {
    /// Convert into a share ready for aggregation.
    pub fn to_share(&self) -> SignatureShare {
        SignatureShare::new(self.node_id, &self.signature, &self.public_key)
    }
}
