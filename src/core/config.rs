//! Collector and application configuration.
//!
//! Values are read once at startup (optionally from a JSON file) and never
//! reloaded while the collector runs.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::core::{Error, Result};
use crate::sampling::material::MaterialTable;

/// Largest accepted sampling radius, in units. A pass visits (2r+1)^2 units per observer.
pub const MAX_SAMPLE_RADIUS: u32 = 64;

/// Column representation written for every sampled unit
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EncodingMode {
    /// One (height, material) pair per column
    Surface,
    /// Every occupied voxel in a vertical band around the surface
    #[default]
    Voxels,
}

/// Configuration for the sampling pipeline.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    /// Host ticks per second. Only used to translate tick counts to wall time.
    pub tick_rate: u32,
    /// A sampling pass runs every this many ticks (40 ticks = 2s at 20 tps).
    pub sample_interval_ticks: u32,
    /// Upper bound on the per-observer sampling radius, in units.
    pub max_radius: u32,
    /// Hard cap on stored units. No eviction: once reached, new units are refused.
    pub max_units: usize,
    pub encoding: EncodingMode,
    /// Lowest absolute y sampled by the voxel encoder.
    pub voxel_floor: i32,
    /// Voxels sampled above the surface by the voxel encoder.
    pub voxel_margin: i32,
    /// Highest absolute y that can hold a voxel.
    pub world_ceiling: i32,
    /// Material code table. `None` selects the built-in table for the encoding.
    pub materials: Option<MaterialTable>,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self::voxels()
    }
}

impl CollectorConfig {
    /// Voxel-list collector: 5-unit radius, 500 units, extended material table.
    pub fn voxels() -> Self {
        Self {
            tick_rate: 20,
            sample_interval_ticks: 40,
            max_radius: 5,
            max_units: 500,
            encoding: EncodingMode::Voxels,
            voxel_floor: 51,
            voxel_margin: 3,
            world_ceiling: 319,
            materials: None,
        }
    }

    /// Surface-pair collector: wider radius and cap, since each unit is a
    /// fixed 768 bytes of payload, and the compact material table.
    pub fn surface() -> Self {
        Self {
            max_radius: 8,
            max_units: 1000,
            encoding: EncodingMode::Surface,
            ..Self::voxels()
        }
    }

    /// Wall-clock time between sampling passes at the configured tick rate
    pub fn sample_period(&self) -> Duration {
        Duration::from_secs_f64(self.sample_interval_ticks as f64 / self.tick_rate.max(1) as f64)
    }

    /// Material table in effect for this configuration
    pub fn material_table(&self) -> MaterialTable {
        match (&self.materials, self.encoding) {
            (Some(table), _) => table.clone(),
            (None, EncodingMode::Surface) => MaterialTable::compact(),
            (None, EncodingMode::Voxels) => MaterialTable::extended(),
        }
    }

    /// Reject values the collector cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tick_rate == 0 {
            return Err(Error::Config("tick_rate must be positive".into()));
        }
        if self.sample_interval_ticks == 0 {
            return Err(Error::Config("sample_interval_ticks must be positive".into()));
        }
        if self.max_radius > MAX_SAMPLE_RADIUS {
            return Err(Error::Config(format!(
                "max_radius {} exceeds the limit of {}",
                self.max_radius, MAX_SAMPLE_RADIUS
            )));
        }
        if self.max_units == 0 {
            return Err(Error::Config("max_units must be positive".into()));
        }
        if self.voxel_floor > self.world_ceiling {
            return Err(Error::Config(format!(
                "voxel_floor {} is above world_ceiling {}",
                self.voxel_floor, self.world_ceiling
            )));
        }
        if self.voxel_margin < 0 {
            return Err(Error::Config("voxel_margin must not be negative".into()));
        }
        if let Some(table) = &self.materials {
            if table.contains_code(MaterialTable::UNKNOWN) {
                return Err(Error::Config(format!(
                    "material code {} is reserved for unknown materials",
                    MaterialTable::UNKNOWN
                )));
            }
        }
        Ok(())
    }
}

/// Where the map server listens
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub enabled: bool,
    pub bind_address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind_address: "0.0.0.0".to_string(),
            port: chunkmap_server::DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// `host:port` string for binding
    pub fn addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// Settings for the procedural demo host
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub seed: u32,
    /// Number of simulated observers
    pub observers: u32,
    /// Units kept loaded around each observer
    pub load_radius: u32,
    /// Global view radius reported to the collector
    pub view_radius: u32,
    /// Observer walking speed in blocks per tick
    pub walk_speed: f32,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 12345,
            observers: 3,
            load_radius: 4,
            view_radius: 10,
            walk_speed: 0.4,
        }
    }
}

/// Top-level configuration file
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub collector: CollectorConfig,
    pub server: ServerConfig,
    pub demo: DemoConfig,
}

impl AppConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        config.collector.validate()?;
        Ok(config)
    }
}
