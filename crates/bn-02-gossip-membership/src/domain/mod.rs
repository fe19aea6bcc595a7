//! # Domain Layer
//!
//! Membership state, merge rules, deduplication and the wire model.
//! No I/O and no clocks: time is always passed in.

pub mod dedup;
pub mod entities;
pub mod errors;
pub mod membership;
pub mod message;
pub mod value_objects;

pub use dedup::DedupCache;
pub use entities::{MemberUpdate, PeerRecord, PeerState, Timestamp};
pub use errors::GossipError;
pub use membership::{MembershipTable, MergeOutcome, StateCounts};
pub use message::{GossipEnvelope, GossipMessage, GossipPayload, MessageId, MessageType};
pub use value_objects::GossipConfig;
