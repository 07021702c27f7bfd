//! Bounded dedup cache of recently processed filings.
//!
//! ## FIFO eviction
//!
//! Identities are kept in insertion order. When the cache is full, the
//! oldest-inserted identity is evicted before the new one is added. Lookups
//! do not refresh an identity's position.

use crate::config::DEFAULT_DEDUP_CAPACITY;
use crate::types::FilingIdentity;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Handle shared by every concurrent entry pipeline.
pub type SharedDedupCache = Arc<Mutex<DedupCache>>;

/// Fixed-capacity, insertion-ordered set of filing identities.
#[derive(Debug, Clone)]
pub struct DedupCache {
    order: VecDeque<FilingIdentity>,
    members: HashSet<FilingIdentity>,
    capacity: usize,
}

impl DedupCache {
    /// Create an empty cache. A capacity of zero is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            order: VecDeque::with_capacity(capacity),
            members: HashSet::with_capacity(capacity),
            capacity,
        }
    }

    /// Wrap the cache for sharing across tasks.
    pub fn shared(self) -> SharedDedupCache {
        Arc::new(Mutex::new(self))
    }

    /// Whether `identity` is currently remembered.
    pub fn seen(&self, identity: &FilingIdentity) -> bool {
        self.members.contains(identity)
    }

    /// Remember `identity`, evicting the oldest entry when full.
    ///
    /// Returns `true` if the identity was newly inserted; recording an
    /// identity already present changes nothing.
    pub fn record(&mut self, identity: FilingIdentity) -> bool {
        if self.members.contains(&identity) {
            return false;
        }
        if self.order.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
        self.members.insert(identity.clone());
        self.order.push_back(identity);
        true
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for DedupCache {
    fn default() -> Self {
        Self::new(DEFAULT_DEDUP_CAPACITY)
    }
}
