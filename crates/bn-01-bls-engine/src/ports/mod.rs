//! # Ports Layer
//!
//! - **Inbound**: [`BlsSigningApi`](inbound::BlsSigningApi), what the transport layer calls
//! - **Outbound**: [`ChainClient`](outbound::ChainClient), what the service calls

pub mod inbound;
pub mod outbound;
