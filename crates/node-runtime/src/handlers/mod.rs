//! Bridges between the subsystem services and the outside world.
//!
//! - [`SigningHandler`]: the hex signing surface, instrumented with metrics
//! - [`gossip`]: timer and datagram loops driving the membership service

pub mod gossip;
mod signing;

pub use signing::SigningHandler;
