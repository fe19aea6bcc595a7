//! # Domain Layer
//!
//! Pure cryptographic logic with no I/O dependencies.

pub mod bls;
pub mod codec;
pub mod entities;
pub mod errors;
pub mod requests;
