//! # Signing Errors
//!
//! Error types for the curve codec and the BLS engine.

use shared_types::HexError;
use thiserror::Error;

/// Errors raised while decoding an EIP-2537 curve point.
///
/// `InvalidLength`, `NonZeroPadding` and `NonCanonicalField` mean the bytes
/// are malformed. `InvalidPoint` means they are well-formed but do not name
/// a point of the prime-order subgroup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CodecError {
    /// Encoded point has the wrong total length.
    #[error("Malformed point: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// One of the 16-byte padding prefixes contains a nonzero byte.
    #[error("Malformed point: nonzero padding in field element {element}")]
    NonZeroPadding { element: usize },

    /// A field element is not below the base field modulus.
    #[error("Malformed point: field element {element} is not canonical")]
    NonCanonicalField { element: usize },

    /// Coordinates are not on the curve or not in the correct subgroup.
    #[error("Invalid point: {0}")]
    InvalidPoint(String),
}

impl CodecError {
    /// True for byte-level layout failures, false for curve failures.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, Self::InvalidPoint(_))
    }
}

/// Errors that can occur during signing and aggregation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// Syntactically invalid input (malformed hex, wrong-length field).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Well-formed bytes that do not decode to a valid subgroup point.
    #[error("Invalid point in share {index} ({field}): {reason}")]
    InvalidPoint {
        index: usize,
        field: &'static str,
        reason: String,
    },

    /// Aggregation requested with zero shares.
    #[error("Cannot aggregate an empty share set")]
    EmptyInput,

    /// EIP-2537 bytes failed layout checks.
    #[error(transparent)]
    MalformedPoint(#[from] CodecError),

    /// Secret key bytes are zero or not below the group order.
    #[error("Invalid secret key")]
    InvalidSecretKey,

    /// The aggregate did not verify against the supplied message.
    #[error("Aggregate signature failed verification")]
    VerificationFailed,
}

impl From<HexError> for SigningError {
    fn from(err: HexError) -> Self {
        Self::Validation(err.to_string())
    }
}
