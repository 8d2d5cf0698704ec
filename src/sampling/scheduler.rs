//! Sampling scheduler - driven once per host tick, samples units around observers.
//!
//! Runs on the host's tick thread only. Every `sample_interval_ticks` ticks a
//! pass walks the square neighborhood of each observer and encodes every
//! loaded unit that has not been sampled yet.

use std::sync::Arc;

use crate::core::config::{CollectorConfig, EncodingMode, MAX_SAMPLE_RADIUS};
use crate::sampling::dedup::DedupIndex;
use crate::sampling::encoder::ColumnEncoder;
use crate::sampling::store::UnitStore;
use crate::world::host::WorldHost;
use crate::world::unit::{Dimension, SpatialUnit};

/// Fires once every `interval` ticks (on ticks K, 2K, 3K, ...)
#[derive(Clone, Debug)]
pub struct TickGate {
    interval: u32,
    counter: u32,
}

impl TickGate {
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            counter: 0,
        }
    }

    /// Count one tick; true if a pass is due
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter < self.interval {
            return false;
        }
        self.counter = 0;
        true
    }

    pub fn interval(&self) -> u32 {
        self.interval
    }
}

/// What one sampling pass did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassReport {
    pub observers: usize,
    /// Candidate units enumerated across all observers
    pub candidates: usize,
    /// Skipped because already in the dedup index
    pub already_sampled: usize,
    /// Skipped because the host had not loaded them (retried next pass)
    pub unloaded: usize,
    /// Observers whose realm the host could not resolve
    pub unknown_realms: usize,
    /// Encoded and stored
    pub encoded: usize,
    /// Encoded, found empty, and dropped
    pub discarded_empty: usize,
    /// New units dropped because the store filled up mid-pass
    pub refused: usize,
}

/// Result of a host tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not a sampling tick
    Idle,
    /// Sampling tick, but the store was full; nothing was visited
    AtCapacity,
    Sampled(PassReport),
}

/// Tick-driven collector writing into the shared store and dedup index
pub struct SamplingScheduler {
    gate: TickGate,
    max_radius: u32,
    encoder: ColumnEncoder,
    store: Arc<UnitStore>,
    dedup: Arc<DedupIndex>,
}

impl SamplingScheduler {
    /// Create a scheduler with a fresh store and index sized from `config`
    pub fn new(config: &CollectorConfig) -> Self {
        Self::with_shared(
            config,
            Arc::new(UnitStore::new(config.max_units)),
            Arc::new(DedupIndex::new()),
        )
    }

    pub fn with_shared(config: &CollectorConfig, store: Arc<UnitStore>, dedup: Arc<DedupIndex>) -> Self {
        Self {
            gate: TickGate::new(config.sample_interval_ticks),
            max_radius: config.max_radius.min(MAX_SAMPLE_RADIUS),
            encoder: ColumnEncoder::new(config),
            store,
            dedup,
        }
    }

    /// Ticks between sampling passes
    pub fn interval(&self) -> u32 {
        self.gate.interval()
    }

    pub fn encoding(&self) -> EncodingMode {
        self.encoder.mode()
    }

    pub fn store(&self) -> &Arc<UnitStore> {
        &self.store
    }

    pub fn dedup(&self) -> &Arc<DedupIndex> {
        &self.dedup
    }

    /// Call once per host tick
    pub fn tick(&mut self, host: &dyn WorldHost) -> TickOutcome {
        if !self.gate.tick() {
            return TickOutcome::Idle;
        }
        self.run_pass(host)
    }

    /// Run a sampling pass now, regardless of the tick gate
    pub fn run_pass(&mut self, host: &dyn WorldHost) -> TickOutcome {
        if !self.store.has_capacity() {
            log::warn!(
                "Max units reached ({}), skipping new units",
                self.store.capacity()
            );
            return TickOutcome::AtCapacity;
        }

        let mut report = PassReport::default();
        let global_radius = host.view_radius();

        for observer in host.observers() {
            report.observers += 1;

            let Some(terrain) = host.terrain(&observer.realm) else {
                log::debug!("Observer {} is in unknown realm {}", observer.name, observer.realm);
                report.unknown_realms += 1;
                continue;
            };

            let dimension = Dimension::from_realm(&observer.realm);
            let radius = self.max_radius.min(observer.view_radius.unwrap_or(global_radius));

            for pos in observer.unit().neighborhood(radius) {
                report.candidates += 1;

                let unit = SpatialUnit::new(pos, dimension.clone());
                let key = unit.key();
                if self.dedup.contains(&key) {
                    report.already_sampled += 1;
                    continue;
                }
                if !terrain.is_unit_loaded(pos) {
                    report.unloaded += 1;
                    continue;
                }
                if !self.store.has_capacity() {
                    if report.refused == 0 {
                        log::warn!(
                            "Max units reached ({}) during pass, dropping new units",
                            self.store.capacity()
                        );
                    }
                    report.refused += 1;
                    continue;
                }

                match self.encoder.encode(&unit, terrain) {
                    Some(encoded) => {
                        self.store.put(key.clone(), encoded);
                        report.encoded += 1;
                    }
                    None => report.discarded_empty += 1,
                }
                self.dedup.add(key);
            }
        }

        if report.encoded > 0 {
            log::info!(
                "Sampled {} new units ({} stored, {} discarded empty)",
                report.encoded,
                self.store.len(),
                report.discarded_empty
            );
        }
        log::debug!("Sampling pass: {:?}", report);

        TickOutcome::Sampled(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampling::testing::{FlatTerrain, TestHost};
    use crate::world::host::Observer;
    use crate::world::unit::{MAX_UNIT_COORD, UnitKey, UnitPos};
    use glam::Vec3;

    const OVERWORLD: &str = "minecraft:overworld";

    fn config(max_radius: u32, max_units: usize) -> CollectorConfig {
        CollectorConfig {
            max_radius,
            max_units,
            ..CollectorConfig::surface()
        }
    }

    fn host_at_origin(view_radius: u32) -> TestHost {
        TestHost::new(view_radius)
            .with_realm(OVERWORLD, FlatTerrain::new(64, "stone"))
            .with_observer(Observer::new("alice", Vec3::new(8.0, 70.0, 8.0), OVERWORLD))
    }

    fn sampled(outcome: TickOutcome) -> PassReport {
        match outcome {
            TickOutcome::Sampled(report) => report,
            other => panic!("expected a pass, got {:?}", other),
        }
    }

    #[test]
    fn test_gate_fires_every_interval() {
        let mut gate = TickGate::new(40);
        let ticks: Vec<u32> = (1..=200u32).filter(|_| gate.tick()).collect();
        assert_eq!(ticks, vec![40, 80, 120, 160, 200]);
    }

    #[test]
    fn test_gate_interval_one() {
        let mut gate = TickGate::new(1);
        assert!((0..10).all(|_| gate.tick()));
    }

    #[test]
    fn test_scheduler_reports_configuration() {
        let scheduler = SamplingScheduler::new(&CollectorConfig {
            sample_interval_ticks: 7,
            ..config(2, 100)
        });
        assert_eq!(scheduler.interval(), 7);
        assert_eq!(scheduler.encoding(), EncodingMode::Surface);
        assert_eq!(SamplingScheduler::new(&CollectorConfig::voxels()).encoding(), EncodingMode::Voxels);
    }

    #[test]
    fn test_tick_only_samples_on_interval() {
        let host = host_at_origin(2);
        let mut scheduler = SamplingScheduler::new(&CollectorConfig {
            sample_interval_ticks: 3,
            ..config(2, 100)
        });

        assert_eq!(scheduler.tick(&host), TickOutcome::Idle);
        assert_eq!(scheduler.tick(&host), TickOutcome::Idle);
        assert!(matches!(scheduler.tick(&host), TickOutcome::Sampled(_)));
        assert_eq!(scheduler.tick(&host), TickOutcome::Idle);
    }

    #[test]
    fn test_enumerates_square_neighborhood() {
        let host = host_at_origin(2);
        let mut scheduler = SamplingScheduler::new(&config(5, 100));

        let report = sampled(scheduler.run_pass(&host));
        assert_eq!(report.candidates, 25);
        assert_eq!(report.encoded, 25);
        assert_eq!(scheduler.store().len(), 25);

        for x in -2..=2 {
            for z in -2..=2 {
                let key = UnitKey::new(&Dimension::Overworld, UnitPos::new(x, z));
                assert_eq!(key.as_str(), format!("overworld_{}_{}", x, z));
                assert!(scheduler.store().contains(&key));
                assert!(scheduler.dedup().contains(&key));
            }
        }
    }

    #[test]
    fn test_huge_radius_is_bounded() {
        let host = host_at_origin(u32::MAX);
        let mut scheduler = SamplingScheduler::new(&config(u32::MAX, 100));

        let side = 2 * MAX_SAMPLE_RADIUS as usize + 1;
        let report = sampled(scheduler.run_pass(&host));
        assert_eq!(report.candidates, side * side);
        assert_eq!(report.encoded, 100);
        assert_eq!(report.refused, side * side - 100);
    }

    #[test]
    fn test_far_observer_sampled_at_border() {
        let host = TestHost::new(1)
            .with_realm(OVERWORLD, FlatTerrain::new(64, "stone"))
            .with_observer(Observer::new("far", Vec3::new(3.0e9, 70.0, 0.0), OVERWORLD))
            .with_observer(Observer::new("west", Vec3::new(-3.0e9, 70.0, -3.0e9), OVERWORLD));
        let mut scheduler = SamplingScheduler::new(&config(5, 100));

        let report = sampled(scheduler.run_pass(&host));
        assert_eq!(report.candidates, 18);
        assert_eq!(report.encoded, 18);

        let edge = UnitKey::new(&Dimension::Overworld, UnitPos::new(MAX_UNIT_COORD, 0));
        assert!(scheduler.store().contains(&edge));
        let corner = UnitKey::new(&Dimension::Overworld, UnitPos::new(-MAX_UNIT_COORD, -MAX_UNIT_COORD));
        assert!(scheduler.store().contains(&corner));
    }

    #[test]
    fn test_radius_capped_by_config() {
        let host = host_at_origin(10);
        let mut scheduler = SamplingScheduler::new(&config(1, 100));

        let report = sampled(scheduler.run_pass(&host));
        assert_eq!(report.candidates, 9);
    }

    #[test]
    fn test_per_observer_radius() {
        let host = TestHost::new(10)
            .with_realm(OVERWORLD, FlatTerrain::new(64, "stone"))
            .with_observer(Observer::new("bob", Vec3::ZERO, OVERWORLD).with_view_radius(0));
        let mut scheduler = SamplingScheduler::new(&config(5, 100));

        let report = sampled(scheduler.run_pass(&host));
        assert_eq!(report.candidates, 1);
        assert_eq!(report.encoded, 1);
    }

    #[test]
    fn test_sampled_units_never_reencoded() {
        let host = host_at_origin(1);
        let mut scheduler = SamplingScheduler::new(&config(5, 100));

        sampled(scheduler.run_pass(&host));
        let second = sampled(scheduler.run_pass(&host));
        assert_eq!(second.encoded, 0);
        assert_eq!(second.already_sampled, 9);

        let encoded = host.realm(OVERWORLD).encoded_units();
        assert_eq!(encoded.len(), 9);
        let mut unique = encoded.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), 9);
    }

    #[test]
    fn test_overlapping_observers_share_units() {
        let host = host_at_origin(1)
            .with_observer(Observer::new("carol", Vec3::new(20.0, 70.0, 0.0), OVERWORLD));
        let mut scheduler = SamplingScheduler::new(&config(5, 100));

        let report = sampled(scheduler.run_pass(&host));
        assert_eq!(report.candidates, 18);
        assert_eq!(report.encoded, 12);
        assert_eq!(report.already_sampled, 6);
    }

    #[test]
    fn test_unloaded_units_retried_later() {
        let terrain = FlatTerrain::new(64, "stone").with_loaded([UnitPos::new(0, 0)]);
        let mut host = TestHost::new(1)
            .with_realm(OVERWORLD, terrain)
            .with_observer(Observer::new("alice", Vec3::ZERO, OVERWORLD));
        let mut scheduler = SamplingScheduler::new(&config(5, 100));

        let first = sampled(scheduler.run_pass(&host));
        assert_eq!(first.encoded, 1);
        assert_eq!(first.unloaded, 8);

        let late = UnitKey::new(&Dimension::Overworld, UnitPos::new(1, 1));
        assert!(!scheduler.dedup().contains(&late));

        host.realm_mut(OVERWORLD).load(UnitPos::new(1, 1));
        let second = sampled(scheduler.run_pass(&host));
        assert_eq!(second.encoded, 1);
        assert_eq!(second.unloaded, 7);
        assert!(scheduler.store().contains(&late));
    }

    #[test]
    fn test_store_never_exceeds_cap() {
        let host = host_at_origin(2);
        let mut scheduler = SamplingScheduler::new(&config(5, 10));

        let report = sampled(scheduler.run_pass(&host));
        assert_eq!(report.encoded, 10);
        assert_eq!(report.refused, 15);
        assert_eq!(scheduler.store().len(), 10);
        // Refused units are not marked, only the admitted ones
        assert_eq!(scheduler.dedup().len(), 10);

        assert_eq!(scheduler.run_pass(&host), TickOutcome::AtCapacity);
        assert_eq!(scheduler.store().len(), 10);
    }

    #[test]
    fn test_all_air_units_marked_not_stored() {
        let host = TestHost::new(1)
            .with_realm(OVERWORLD, FlatTerrain::empty())
            .with_observer(Observer::new("alice", Vec3::ZERO, OVERWORLD));
        let mut scheduler = SamplingScheduler::new(&CollectorConfig {
            encoding: EncodingMode::Voxels,
            ..config(0, 100)
        });

        let report = sampled(scheduler.run_pass(&host));
        assert_eq!(report.discarded_empty, 1);
        assert!(scheduler.store().is_empty());
        assert_eq!(scheduler.dedup().len(), 1);

        let again = sampled(scheduler.run_pass(&host));
        assert_eq!(again.already_sampled, 1);
        assert_eq!(host.realm(OVERWORLD).encoded_units().len(), 1);
    }

    #[test]
    fn test_voxel_unit_stored_under_its_key() {
        let host = TestHost::new(1)
            .with_realm("minecraft:the_nether", FlatTerrain::new(60, "netherrack"))
            .with_observer(Observer::new("dan", Vec3::new(-20.0, 64.0, 40.0), "minecraft:the_nether"));
        let mut scheduler = SamplingScheduler::new(&CollectorConfig {
            encoding: EncodingMode::Voxels,
            ..config(0, 100)
        });

        sampled(scheduler.run_pass(&host));
        let values = scheduler.store().snapshot_values();
        assert_eq!(values.len(), 1);
        assert_eq!(values[0].key().as_str(), "nether_-2_2");
    }

    #[test]
    fn test_unknown_realm_skipped() {
        let host = TestHost::new(2)
            .with_observer(Observer::new("eve", Vec3::ZERO, "mymod:void"));
        let mut scheduler = SamplingScheduler::new(&config(5, 100));

        let report = sampled(scheduler.run_pass(&host));
        assert_eq!(report.unknown_realms, 1);
        assert_eq!(report.candidates, 0);
    }

    #[test]
    fn test_no_observers() {
        let host = TestHost::new(2).with_realm(OVERWORLD, FlatTerrain::new(64, "stone"));
        let mut scheduler = SamplingScheduler::new(&config(5, 100));

        assert_eq!(scheduler.run_pass(&host), TickOutcome::Sampled(PassReport::default()));
    }
}
