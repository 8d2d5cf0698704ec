//! Dedup index - units that have already been sampled.
//!
//! Marks are permanent for the life of the process; a sampled unit is
//! never refreshed.

use dashmap::DashSet;

use crate::world::unit::UnitKey;

#[derive(Default)]
pub struct DedupIndex {
    keys: DashSet<UnitKey>,
}

impl DedupIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, key: &UnitKey) -> bool {
        self.keys.contains(key)
    }

    /// Mark a unit as sampled. Returns false if it was already marked.
    pub fn add(&self, key: UnitKey) -> bool {
        self.keys.insert(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}
