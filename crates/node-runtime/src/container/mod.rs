//! # Node Container
//!
//! Configuration and the wired set of services the runtime drives.

pub mod config;
mod subsystems;

pub use config::{ConfigError, IdentityConfig, NetworkConfig, NodeConfig};
pub use subsystems::{GossipNode, NodeContainer, SigningService};
