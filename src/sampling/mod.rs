//! Terrain sampling: tick-driven collection into a bounded, deduplicated store

pub mod material;
pub mod encoder;
pub mod store;
pub mod dedup;
pub mod scheduler;
pub mod export;

#[cfg(test)]
pub(crate) mod testing;

pub use material::MaterialTable;
pub use encoder::{ColumnData, ColumnEncoder, EncodedUnit, VoxelRecord};
pub use store::UnitStore;
pub use dedup::DedupIndex;
pub use scheduler::{PassReport, SamplingScheduler, TickGate, TickOutcome};
pub use export::{ExportStats, SnapshotExporter};
