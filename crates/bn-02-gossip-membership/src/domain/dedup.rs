//! # Dedup Cache
//!
//! Bounded FIFO set of recently seen message ids. Makes message handling
//! idempotent: a message delivered twice over different relay paths is
//! applied and forwarded once.

use std::collections::{HashSet, VecDeque};

use super::message::MessageId;

/// FIFO-evicted set of message ids.
#[derive(Debug, Clone)]
pub struct DedupCache {
    seen: HashSet<MessageId>,
    insertion_order: VecDeque<MessageId>,
    capacity: usize,
}

impl DedupCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            seen: HashSet::with_capacity(capacity),
            insertion_order: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn seen(&self, id: &MessageId) -> bool {
        self.seen.contains(id)
    }

    /// Insert `id`, evicting the oldest entry when over capacity.
    ///
    /// Returns `false` if `id` was already present.
    pub fn record(&mut self, id: MessageId) -> bool {
        if !self.seen.insert(id) {
            return false;
        }
        self.insertion_order.push_back(id);
        while self.insertion_order.len() > self.capacity {
            if let Some(oldest) = self.insertion_order.pop_front() {
                self.seen.remove(&oldest);
            }
        }
        true
    }

    pub fn len(&self) -> usize {
        self.insertion_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insertion_order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
