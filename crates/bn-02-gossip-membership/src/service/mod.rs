//! # Gossip Service
//!
//! Implements [`GossipApi`](crate::ports::GossipApi) over the membership
//! table and dedup cache.
//!
//! Four periodic activities are driven from outside (heartbeat, gossip,
//! suspicion sweep, cleanup sweep); inbound messages arrive through
//! `on_envelope`. The service owns no timers and no sockets.

mod api;
mod core;
mod receive;
mod ticks;

pub use core::GossipService;
