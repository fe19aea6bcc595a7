//! # EIP-2537 Curve Codec
//!
//! Fixed-width encoding of G1 and G2 points for the BLS12-381 precompiles.
//!
//! Every base field element occupies 64 bytes: 16 zero bytes followed by the
//! 48-byte big-endian value. G1 is `x || y` (128 bytes). G2 is
//! `x.c0 || x.c1 || y.c0 || y.c1` (256 bytes). The point at infinity is all
//! zeros.
//!
//! blst's uncompressed serialization orders Fp2 coefficients `c1, c0` and
//! flags infinity with `0x40` in the first byte; both are translated here.

use blst::min_pk::{PublicKey, Signature};

use super::entities::{BlsPublicKey, BlsSignature};
use super::errors::CodecError;

/// Size of one padded base field element.
pub const FIELD_ELEMENT_LEN: usize = 64;

/// Leading zero bytes in each padded element.
pub const PADDING_LEN: usize = 16;

/// Significant bytes of a base field element.
const FP_LEN: usize = 48;

/// Encoded G1 point length.
pub const G1_ENCODED_LEN: usize = 2 * FIELD_ELEMENT_LEN;

/// Encoded G2 point length.
pub const G2_ENCODED_LEN: usize = 4 * FIELD_ELEMENT_LEN;

/// blst flag bit marking the point at infinity.
const INFINITY_FLAG: u8 = 0x40;

/// BLS12-381 base field modulus, big-endian.
const FIELD_MODULUS: [u8; FP_LEN] = [
    0x1a, 0x01, 0x11, 0xea, 0x39, 0x7f, 0xe6, 0x9a, 0x4b, 0x1b, 0xa7, 0xb6, 0x43, 0x4b, 0xac, 0xd7,
    0x64, 0x77, 0x4b, 0x84, 0xf3, 0x85, 0x12, 0xbf, 0x67, 0x30, 0xd2, 0xa0, 0xf6, 0xb0, 0xf6, 0x24,
    0x1e, 0xab, 0xff, 0xfe, 0xb1, 0x53, 0xff, 0xff, 0xb9, 0xfe, 0xff, 0xff, 0xff, 0xff, 0xaa, 0xab,
];

// blst raw offsets for each EIP-2537 element of a G2 point.
const G2_RAW_ORDER: [usize; 4] = [FP_LEN, 0, 3 * FP_LEN, 2 * FP_LEN];

/// Encode a G1 point (public key) to 128 bytes.
pub fn encode_g1(point: &BlsPublicKey) -> [u8; G1_ENCODED_LEN] {
    let raw = point.point().serialize();
    let mut out = [0u8; G1_ENCODED_LEN];
    if raw[0] & INFINITY_FLAG != 0 {
        return out;
    }
    for element in 0..2 {
        let dst = element * FIELD_ELEMENT_LEN + PADDING_LEN;
        out[dst..dst + FP_LEN].copy_from_slice(&raw[element * FP_LEN..(element + 1) * FP_LEN]);
    }
    out
}

/// Encode a G2 point (signature) to 256 bytes.
pub fn encode_g2(point: &BlsSignature) -> [u8; G2_ENCODED_LEN] {
    let raw = point.point().serialize();
    let mut out = [0u8; G2_ENCODED_LEN];
    if raw[0] & INFINITY_FLAG != 0 {
        return out;
    }
    for (element, src) in G2_RAW_ORDER.iter().enumerate() {
        let dst = element * FIELD_ELEMENT_LEN + PADDING_LEN;
        out[dst..dst + FP_LEN].copy_from_slice(&raw[*src..*src + FP_LEN]);
    }
    out
}

/// Decode a 128-byte G1 point.
///
/// Rejects wrong length, nonzero padding, non-canonical coordinates, points
/// off the curve and points outside the prime-order subgroup.
pub fn decode_g1(bytes: &[u8]) -> Result<BlsPublicKey, CodecError> {
    let elements = split_elements::<2>(bytes, G1_ENCODED_LEN)?;

    let mut raw = [0u8; 2 * FP_LEN];
    if elements.iter().all(is_zero) {
        raw[0] = INFINITY_FLAG;
        return PublicKey::deserialize(&raw)
            .map(BlsPublicKey::from_point)
            .map_err(|e| CodecError::InvalidPoint(format!("{e:?}")));
    }

    for (element, value) in elements.iter().enumerate() {
        raw[element * FP_LEN..(element + 1) * FP_LEN].copy_from_slice(value);
    }

    let point = PublicKey::deserialize(&raw)
        .map_err(|e| CodecError::InvalidPoint(format!("not on curve: {e:?}")))?;
    point
        .validate()
        .map_err(|e| CodecError::InvalidPoint(format!("subgroup check failed: {e:?}")))?;
    Ok(BlsPublicKey::from_point(point))
}

/// Decode a 256-byte G2 point.
pub fn decode_g2(bytes: &[u8]) -> Result<BlsSignature, CodecError> {
    let elements = split_elements::<4>(bytes, G2_ENCODED_LEN)?;

    let mut raw = [0u8; 4 * FP_LEN];
    if elements.iter().all(is_zero) {
        raw[0] = INFINITY_FLAG;
        return Signature::deserialize(&raw)
            .map(BlsSignature::from_point)
            .map_err(|e| CodecError::InvalidPoint(format!("{e:?}")));
    }

    for (element, dst) in G2_RAW_ORDER.iter().enumerate() {
        raw[*dst..*dst + FP_LEN].copy_from_slice(&elements[element]);
    }

    let point = Signature::deserialize(&raw)
        .map_err(|e| CodecError::InvalidPoint(format!("not on curve: {e:?}")))?;
    point
        .validate(true)
        .map_err(|e| CodecError::InvalidPoint(format!("subgroup check failed: {e:?}")))?;
    Ok(BlsSignature::from_point(point))
}

/// Check length, strip padding and range-check each field element.
fn split_elements<const N: usize>(
    bytes: &[u8],
    expected: usize,
) -> Result<[[u8; FP_LEN]; N], CodecError> {
    if bytes.len() != expected {
        return Err(CodecError::InvalidLength {
            expected,
            actual: bytes.len(),
        });
    }

    let mut elements = [[0u8; FP_LEN]; N];
    for (element, chunk) in bytes.chunks_exact(FIELD_ELEMENT_LEN).enumerate() {
        let (padding, value) = chunk.split_at(PADDING_LEN);
        if padding.iter().any(|b| *b != 0) {
            return Err(CodecError::NonZeroPadding { element });
        }
        // Big-endian byte arrays compare lexicographically as integers.
        if value >= &FIELD_MODULUS[..] {
            return Err(CodecError::NonCanonicalField { element });
        }
        elements[element].copy_from_slice(value);
    }
    Ok(elements)
}

fn is_zero(value: &[u8; FP_LEN]) -> bool {
    value.iter().all(|b| *b == 0)
}
