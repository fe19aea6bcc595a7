//! # Ports Layer
//!
//! - **Inbound**: [`GossipApi`], driven by the runtime's timers and receive loop
//! - **Outbound**: [`GossipTransport`] and [`TimeSource`]

pub mod inbound;
pub mod outbound;

pub use inbound::{GossipApi, GossipStats, ReceiveOutcome, SweepReport, TickReport};
pub use outbound::{GossipTransport, TimeSource, TransportError};
