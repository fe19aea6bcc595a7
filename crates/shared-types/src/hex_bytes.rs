//! `0x`-prefixed hex helpers and serde adapters for fixed-width byte arrays.
//!
//! Use with `#[serde(with = "shared_types::hex_bytes")]` on any `[u8; N]` field.

use serde::{de, Deserialize, Deserializer, Serializer};

use crate::errors::HexError;

/// Encode bytes as lowercase `0x`-prefixed hex.
pub fn encode_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Decode a `0x`-prefixed hex string into exactly `N` bytes.
///
/// `field` names the input in the returned error.
pub fn decode_fixed_hex<const N: usize>(field: &str, input: &str) -> Result<[u8; N], HexError> {
    let digits = input
        .strip_prefix("0x")
        .or_else(|| input.strip_prefix("0X"))
        .ok_or_else(|| HexError::MissingPrefix {
            field: field.to_string(),
        })?;

    let bytes = hex::decode(digits).map_err(|e| HexError::Malformed {
        field: field.to_string(),
        reason: e.to_string(),
    })?;

    let actual = bytes.len();
    bytes.try_into().map_err(|_| HexError::WrongLength {
        field: field.to_string(),
        expected: N,
        actual,
    })
}

pub fn serialize<S, const N: usize>(bytes: &[u8; N], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&encode_hex(bytes))
}

pub fn deserialize<'de, D, const N: usize>(deserializer: D) -> Result<[u8; N], D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    decode_fixed_hex::<N>("value", &s).map_err(de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_lowercase_and_prefixed() {
        assert_eq!(encode_hex(&[0xAB, 0x01]), "0xab01");
    }

    #[test]
    fn test_decode_accepts_exact_length() {
        let out: [u8; 2] = decode_fixed_hex("field", "0xab01").unwrap();
        assert_eq!(out, [0xAB, 0x01]);
    }

    #[test]
    fn test_decode_rejects_missing_prefix() {
        let err = decode_fixed_hex::<2>("signature", "ab01").unwrap_err();
        assert!(matches!(err, HexError::MissingPrefix { .. }));
        assert_eq!(err.field(), "signature");
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let err = decode_fixed_hex::<3>("publicKey", "0xab01").unwrap_err();
        assert_eq!(
            err,
            HexError::WrongLength {
                field: "publicKey".into(),
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_decode_rejects_non_hex() {
        let err = decode_fixed_hex::<2>("field", "0xzz01").unwrap_err();
        assert!(matches!(err, HexError::Malformed { .. }));
    }
}
