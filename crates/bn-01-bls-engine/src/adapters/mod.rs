//! # Adapters
//!
//! Chain client implementations that need no network access.
//!
//! A JSON-RPC registry client belongs to the deployment, not this crate.

mod chain;

pub use chain::{InMemoryChainClient, UnconfiguredChainClient};
