//! Bounded unit store - the shared keyed collection of encoded units.
//!
//! The cap is an admission limit, not a cache policy: nothing is ever
//! evicted, and callers check `has_capacity` before inserting a new key.
//! Readers never block the single writer for longer than a shard lock.

use std::sync::Arc;

use dashmap::DashMap;

use crate::sampling::encoder::EncodedUnit;
use crate::world::unit::UnitKey;

/// Concurrent map from unit key to encoded unit, capped at `capacity` entries
pub struct UnitStore {
    units: DashMap<UnitKey, Arc<EncodedUnit>>,
    capacity: usize,
}

impl UnitStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            units: DashMap::new(),
            capacity,
        }
    }

    /// Insert or overwrite. Performs no size check.
    pub fn put(&self, key: UnitKey, unit: EncodedUnit) {
        self.units.insert(key, Arc::new(unit));
    }

    pub fn get(&self, key: &UnitKey) -> Option<Arc<EncodedUnit>> {
        self.units.get(key).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, key: &UnitKey) -> bool {
        self.units.contains_key(key)
    }

    /// Current cardinality
    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Whether a new key may still be admitted
    pub fn has_capacity(&self) -> bool {
        self.len() < self.capacity
    }

    /// Point-in-time copy of all units, ordered by key.
    ///
    /// A `put` racing with this call may or may not be included.
    pub fn snapshot_values(&self) -> Vec<Arc<EncodedUnit>> {
        let mut entries: Vec<(UnitKey, Arc<EncodedUnit>)> = self
            .units
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, unit)| unit).collect()
    }
}
