//! # BLS Engine (BLS12-381, min-pk)
//!
//! Pure signing, aggregation and verification over blst.
//!
//! - Public keys are G1 points (48 bytes compressed)
//! - Signatures are G2 points (96 bytes compressed)
//!
//! Aggregation never trusts its input: every share is decoded with full
//! on-curve and subgroup checks before any point is added.

use blst::min_pk::{AggregatePublicKey, AggregateSignature, PublicKey, SecretKey, Signature};
use blst::BLST_ERROR;
use rayon::prelude::*;
use tracing::{debug, warn};

use super::codec;
use super::entities::{
    AggregateResult, BlsPublicKey, BlsSecretKey, BlsSignature, SignatureShare, SECRET_KEY_LEN,
};
use super::errors::{CodecError, SigningError};

/// Domain separation tag: min-pk basic scheme.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G2_XMD:SHA-256_SSWU_RO_NUL_";

/// The scalar 1; signing with it yields H(m) itself.
const UNIT_SCALAR: [u8; SECRET_KEY_LEN] = {
    let mut bytes = [0u8; SECRET_KEY_LEN];
    bytes[SECRET_KEY_LEN - 1] = 1;
    bytes
};

/// Sign `message` with `secret`. Deterministic for identical inputs.
pub fn sign(message: &[u8], secret: &BlsSecretKey) -> BlsSignature {
    BlsSignature::from_point(secret.inner().sign(message, DST, &[]))
}

/// Scalar-multiply the G1 generator by `secret`.
pub fn derive_public_key(secret: &BlsSecretKey) -> BlsPublicKey {
    BlsPublicKey::from_point(secret.inner().sk_to_pk())
}

/// Hash `message` to G2 under [`DST`].
pub fn hash_to_g2(message: &[u8]) -> Result<BlsSignature, SigningError> {
    let unit = SecretKey::from_bytes(&UNIT_SCALAR).map_err(|_| SigningError::InvalidSecretKey)?;
    Ok(BlsSignature::from_point(unit.sign(message, DST, &[])))
}

/// EIP-2537 encoding of H(message), the G2 input of the on-chain pairing check.
pub fn message_point(message: &[u8]) -> Result<[u8; codec::G2_ENCODED_LEN], SigningError> {
    hash_to_g2(message).map(|point| point.to_eip2537())
}

/// Verify one signature under one public key.
pub fn verify_signature(message: &[u8], signature: &BlsSignature, public_key: &BlsPublicKey) -> bool {
    signature
        .point()
        .verify(true, message, DST, &[], public_key.point(), true)
        == BLST_ERROR::BLST_SUCCESS
}

/// Sum signatures over G2 and public keys over G1.
///
/// Fails with [`SigningError::EmptyInput`] for an empty set and with
/// [`SigningError::InvalidPoint`] if any share holds an invalid point; in
/// either case no summation happens. The result is independent of the order
/// of `shares`, while `node_ids` preserves it.
pub fn aggregate(shares: &[SignatureShare]) -> Result<AggregateResult, SigningError> {
    if shares.is_empty() {
        return Err(SigningError::EmptyInput);
    }

    // Decode in parallel, report the lowest failing index.
    let decoded: Vec<Result<(Signature, PublicKey), SigningError>> = shares
        .par_iter()
        .enumerate()
        .map(|(index, share)| decode_share(index, share))
        .collect();

    let mut signatures = Vec::with_capacity(shares.len());
    let mut public_keys = Vec::with_capacity(shares.len());
    for result in decoded {
        match result {
            Ok((sig, pk)) => {
                signatures.push(sig);
                public_keys.push(pk);
            }
            Err(err) => {
                warn!(event = "invalid_point", error = %err, "Rejected aggregation input");
                return Err(err);
            }
        }
    }

    let sig_refs: Vec<&Signature> = signatures.iter().collect();
    let pk_refs: Vec<&PublicKey> = public_keys.iter().collect();

    // Inputs were validated above.
    let aggregate_signature = AggregateSignature::aggregate(&sig_refs, false)
        .map_err(|_| SigningError::EmptyInput)?
        .to_signature();
    let aggregate_public_key = AggregatePublicKey::aggregate(&pk_refs, false)
        .map_err(|_| SigningError::EmptyInput)?
        .to_public_key();

    debug!(shares = shares.len(), "Aggregated signature shares");

    Ok(AggregateResult {
        node_ids: shares.iter().map(|s| s.node_id).collect(),
        aggregate_signature: codec::encode_g2(&BlsSignature::from_point(aggregate_signature)),
        aggregate_public_key: codec::encode_g1(&BlsPublicKey::from_point(aggregate_public_key)),
        message_point: None,
    })
}

/// Aggregate shares that all sign `message`, verify the result, and attach H(message).
pub fn aggregate_for_message(
    message: &[u8],
    shares: &[SignatureShare],
) -> Result<AggregateResult, SigningError> {
    let mut result = aggregate(shares)?;
    if !verify(message, &result.aggregate_signature, &result.aggregate_public_key)? {
        warn!(shares = shares.len(), "Aggregate failed self-verification");
        return Err(SigningError::VerificationFailed);
    }
    result.message_point = Some(message_point(message)?);
    Ok(result)
}

/// Verify an EIP-2537 encoded aggregate over a single common message.
///
/// Malformed encodings are [`SigningError::MalformedPoint`], well-formed
/// bytes off the curve or outside the subgroup are
/// [`SigningError::InvalidPoint`], and a valid pair that does not verify is
/// `Ok(false)`.
pub fn verify(
    message: &[u8],
    aggregate_signature: &[u8],
    aggregate_public_key: &[u8],
) -> Result<bool, SigningError> {
    let signature = codec::decode_g2(aggregate_signature)
        .map_err(|e| point_error("aggregateSignature", e))?;
    let public_key = codec::decode_g1(aggregate_public_key)
        .map_err(|e| point_error("aggregatePublicKey", e))?;
    Ok(verify_signature(message, &signature, &public_key))
}

fn point_error(field: &'static str, err: CodecError) -> SigningError {
    match err {
        CodecError::InvalidPoint(reason) => {
            warn!(event = "invalid_point", field, %reason, "Rejected verification input");
            SigningError::InvalidPoint {
                index: 0,
                field,
                reason,
            }
        }
        malformed => SigningError::MalformedPoint(malformed),
    }
}

/// Standard aggregate verification: `e(g1, σ) == Π e(pk_i, H(m_i))`.
///
/// `messages` and `public_keys` are paired by position.
pub fn verify_aggregate(
    messages: &[&[u8]],
    aggregate_signature: &BlsSignature,
    public_keys: &[BlsPublicKey],
) -> bool {
    if messages.is_empty() || messages.len() != public_keys.len() {
        return false;
    }
    let pk_refs: Vec<&PublicKey> = public_keys.iter().map(|pk| pk.point()).collect();
    aggregate_signature
        .point()
        .aggregate_verify(true, messages, DST, &pk_refs, true)
        == BLST_ERROR::BLST_SUCCESS
}

fn decode_share(index: usize, share: &SignatureShare) -> Result<(Signature, PublicKey), SigningError> {
    let signature =
        Signature::sig_validate(&share.signature, true).map_err(|e| SigningError::InvalidPoint {
            index,
            field: "signature",
            reason: format!("{e:?}"),
        })?;
    let public_key =
        PublicKey::key_validate(&share.public_key).map_err(|e| SigningError::InvalidPoint {
            index,
            field: "publicKey",
            reason: format!("{e:?}"),
        })?;
    Ok((signature, public_key))
}
