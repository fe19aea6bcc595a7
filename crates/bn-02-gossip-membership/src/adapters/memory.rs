use std::collections::HashSet;

use parking_lot::Mutex;

use crate::domain::GossipEnvelope;
use crate::ports::{GossipTransport, TransportError};

/// Transport that records every send instead of touching the network.
///
/// A harness delivers the recorded envelopes to other in-process services,
/// which makes message loss, duplication and partitions easy to script.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    sent: Mutex<Vec<(String, GossipEnvelope)>>,
    failing: Mutex<HashSet<String>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `url` fail with `Unreachable`.
    pub fn fail_url(&self, url: impl Into<String>) {
        self.failing.lock().insert(url.into());
    }

    pub fn restore_url(&self, url: &str) {
        self.failing.lock().remove(url);
    }

    /// Copy of everything sent so far.
    pub fn sent(&self) -> Vec<(String, GossipEnvelope)> {
        self.sent.lock().clone()
    }

    /// Drain the outbox.
    pub fn take_sent(&self) -> Vec<(String, GossipEnvelope)> {
        std::mem::take(&mut *self.sent.lock())
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn sent_to(&self, url: &str) -> Vec<GossipEnvelope> {
        self.sent
            .lock()
            .iter()
            .filter(|(u, _)| u == url)
            .map(|(_, e)| e.clone())
            .collect()
    }
}

impl GossipTransport for InMemoryTransport {
    fn send(&self, url: &str, envelope: &GossipEnvelope) -> Result<(), TransportError> {
        if self.failing.lock().contains(url) {
            return Err(TransportError::Unreachable(url.to_string()));
        }
        self.sent.lock().push((url.to_string(), envelope.clone()));
        Ok(())
    }
}
