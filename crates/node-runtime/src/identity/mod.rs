//! # Node Identity Persistence
//!
//! The node's key material lives in a single JSON state file:
//!
//! ```json
//! {
//!   "nodeId": "0x…",
//!   "privateKey": "0x…",
//!   "publicKey": "0x…",
//!   "registered": false,
//!   "stakeStatus": "none"
//! }
//! ```
//!
//! Writes replace the file atomically (temp file, fsync, rename).

mod store;

pub use store::{IdentityStore, IdentityStoreError, NodeState};
