//! Snapshot exporter - serializes the store for external consumers.
//!
//! Read-only with respect to the store and dedup index, so any number of
//! exporters may run alongside a sampling pass.

use std::sync::Arc;

use serde::Serialize;

use crate::core::Result;
use crate::sampling::dedup::DedupIndex;
use crate::sampling::encoder::EncodedUnit;
use crate::sampling::store::UnitStore;

/// Counters served next to the document
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportStats {
    /// Units currently stored
    pub unit_count: usize,
    /// Units ever sampled, including those discarded as empty
    pub sampled_count: usize,
    /// Store cap
    pub capacity: usize,
}

#[derive(Clone)]
pub struct SnapshotExporter {
    store: Arc<UnitStore>,
    dedup: Arc<DedupIndex>,
}

impl SnapshotExporter {
    pub fn new(store: Arc<UnitStore>, dedup: Arc<DedupIndex>) -> Self {
        Self { store, dedup }
    }

    /// Current units, ordered by key
    pub fn snapshot(&self) -> Vec<Arc<EncodedUnit>> {
        self.store.snapshot_values()
    }

    /// The wire document: a JSON array of encoded units
    pub fn to_json(&self) -> Result<String> {
        Ok(self.encode_document()?)
    }

    fn encode_document(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }

    pub fn stats(&self) -> ExportStats {
        ExportStats {
            unit_count: self.store.len(),
            sampled_count: self.dedup.len(),
            capacity: self.store.capacity(),
        }
    }
}

impl chunkmap_server::SnapshotSource for SnapshotExporter {
    fn document(&self) -> serde_json::Result<String> {
        self.encode_document()
    }

    fn stats(&self) -> serde_json::Value {
        serde_json::to_value(SnapshotExporter::stats(self)).unwrap_or(serde_json::Value::Null)
    }
}
