//! # BLS Node Test Suite
//!
//! Cross-crate scenarios that no single subsystem crate can exercise alone.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # In-process cluster simulator (simulated clock, scripted delivery)
//! └── integration/
//!     ├── signing.rs             # Sign, aggregate, verify across several nodes
//!     └── gossip_convergence.rs  # Join, loss, crash and partition scenarios
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p bn-tests
//!
//! # By category
//! cargo test -p bn-tests integration::signing
//! cargo test -p bn-tests integration::gossip_convergence
//!
//! # Benchmarks
//! cargo bench -p bn-tests
//! ```

pub mod harness;
pub mod integration;

pub use harness::{node_id, node_url, Cluster, LinkConditions, SimNode};
