//! # Error Types
//!
//! Errors raised while parsing the hex surface shared by all crates.

use thiserror::Error;

/// Errors that can occur when decoding a fixed-width `0x` hex field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HexError {
    /// The string does not start with `0x`.
    #[error("{field}: missing 0x prefix")]
    MissingPrefix { field: String },

    /// The string contains a non-hex character or an odd number of digits.
    #[error("{field}: malformed hex ({reason})")]
    Malformed { field: String, reason: String },

    /// The decoded value has the wrong number of bytes.
    #[error("{field}: expected {expected} bytes, got {actual}")]
    WrongLength {
        field: String,
        expected: usize,
        actual: usize,
    },
}

impl HexError {
    /// Name of the field that failed to parse.
    pub fn field(&self) -> &str {
        match self {
            Self::MissingPrefix { field }
            | Self::Malformed { field, .. }
            | Self::WrongLength { field, .. } => field,
        }
    }
}
