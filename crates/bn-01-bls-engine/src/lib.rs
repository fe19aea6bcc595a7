//! # BLS Engine (BN-01)
//!
//! BLS12-381 signing and cross-node aggregation with byte-exact EIP-2537
//! point encodings for on-chain verification.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): codec, curve arithmetic, DTOs; no I/O
//! - **Ports Layer** (`ports/`): `BlsSigningApi` inbound, `ChainClient` outbound
//! - **Service Layer** (`service.rs`): binds the local identity to the ports
//! - **Adapters** (`adapters/`): in-process chain clients
//!
//! ## Security Notes
//!
//! - Every aggregated point is on-curve and subgroup checked; invalid points
//!   are logged with `event = "invalid_point"`
//! - Secret keys never serialize and debug-print redacted

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{InMemoryChainClient, UnconfiguredChainClient};
pub use domain::bls::{
    aggregate, aggregate_for_message, derive_public_key, hash_to_g2, message_point, sign, verify,
    verify_aggregate, verify_signature, DST,
};
pub use domain::codec::{decode_g1, decode_g2, encode_g1, encode_g2, G1_ENCODED_LEN, G2_ENCODED_LEN};
pub use domain::entities::{
    AggregateResult, BlsPublicKey, BlsSecretKey, BlsSignature, NodeIdentity, SignatureShare,
    SignedMessage, PUBLIC_KEY_LEN, SECRET_KEY_LEN, SIGNATURE_LEN,
};
pub use domain::errors::{CodecError, SigningError};
pub use domain::requests::{
    AggregateRequest, AggregateResponse, ShareInput, SignRequest, SignResponse,
};
pub use ports::inbound::BlsSigningApi;
pub use ports::outbound::{ChainClient, ChainClientError, ChainOperationResult};
pub use service::BlsSigningService;
