//! Test utilities for gossip membership.
//!
//! Enable with the `test-utils` feature flag.
//!
//! # Example
//!
//! ```rust,ignore
//! use bn_02_gossip_membership::test_utils::ControllableTimeSource;
//! use bn_02_gossip_membership::TimeSource;
//!
//! let clock = ControllableTimeSource::new(1_000);
//! let handle = clock.clone();
//! handle.advance(500);
//! assert_eq!(clock.now().as_millis(), 1_500);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::domain::Timestamp;
use crate::ports::TimeSource;

/// Simulated clock in milliseconds.
///
/// Clones share the same clock, so a test can keep a handle after boxing
/// one copy into a service.
#[derive(Debug, Clone, Default)]
pub struct ControllableTimeSource {
    millis: Arc<AtomicU64>,
}

impl ControllableTimeSource {
    pub fn new(initial_millis: u64) -> Self {
        Self {
            millis: Arc::new(AtomicU64::new(initial_millis)),
        }
    }

    /// Advance the clock; drives timeout and expiration behavior.
    pub fn advance(&self, millis: u64) {
        self.millis.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: u64) {
        self.millis.store(millis, Ordering::SeqCst);
    }
}

impl TimeSource for ControllableTimeSource {
    fn now(&self) -> Timestamp {
        Timestamp::new(self.millis.load(Ordering::SeqCst))
    }
}
