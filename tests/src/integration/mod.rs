//! Cross-subsystem scenarios.

pub mod gossip_convergence;
pub mod signing;
