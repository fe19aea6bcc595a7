//! # Node Runtime Library
//!
//! Composition root for a BLS aggregation node: configuration, identity
//! persistence, service wiring and the gossip loops. The binary in
//! `main.rs` only loads configuration and drives [`NodeRuntime`].
//!
//! ## Modules
//!
//! - `container/` - configuration and service wiring
//! - `identity/` - node state file
//! - `handlers/` - signing facade and gossip loops
//! - `runtime` - startup and shutdown

pub mod container;
pub mod handlers;
pub mod identity;
pub mod runtime;

use std::io;
use std::net::SocketAddr;

use bn_02_gossip_membership::GossipError;
use thiserror::Error;

pub use container::{ConfigError, NodeConfig, NodeContainer};
pub use identity::{IdentityStore, IdentityStoreError, NodeState};
pub use runtime::NodeRuntime;

/// Errors raised while assembling the node.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Identity(#[from] IdentityStoreError),

    #[error("gossip service: {0}")]
    Gossip(#[from] GossipError),

    #[error("failed to bind gossip socket on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },
}
