//! # Shared Types Crate
//!
//! Identifiers and `0x`-prefixed hex encodings used across the workspace.
//!
//! ## Design Principles
//!
//! - **Fixed width**: every byte-string field has a fixed length known at
//!   compile time, so length checks happen before any curve arithmetic.
//! - **One hex dialect**: all external byte strings are lowercase `0x` hex.

pub mod entities;
pub mod errors;
pub mod hex_bytes;

pub use entities::*;
pub use errors::*;
pub use hex_bytes::{decode_fixed_hex, encode_hex};
