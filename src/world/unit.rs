//! Spatial units - the horizontal column groups the collector samples.

use std::fmt;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Unit width along x and z, in voxels
pub const UNIT_SIZE: i32 = 16;

/// Columns per unit (16 x 16)
pub const COLUMNS_PER_UNIT: usize = (UNIT_SIZE * UNIT_SIZE) as usize;

/// Horizontal world border, in voxels. Positions beyond it map to the edge unit.
pub const WORLD_BORDER: i32 = 30_000_000;

/// Largest unit coordinate on either axis
pub const MAX_UNIT_COORD: i32 = WORLD_BORDER / UNIT_SIZE;

/// Horizontal unit coordinate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitPos {
    pub x: i32,
    pub z: i32,
}

impl UnitPos {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// World x of the unit's first column
    pub fn origin_x(&self) -> i32 {
        self.x.saturating_mul(UNIT_SIZE)
    }

    /// World z of the unit's first column
    pub fn origin_z(&self) -> i32 {
        self.z.saturating_mul(UNIT_SIZE)
    }

    pub fn offset(&self, dx: i32, dz: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.z.saturating_add(dz))
    }

    /// Every unit in the square of `radius` around this one, row by row.
    /// Yields (2 * radius + 1)^2 positions.
    pub fn neighborhood(self, radius: u32) -> impl Iterator<Item = UnitPos> {
        let r = i32::try_from(radius).unwrap_or(i32::MAX);
        (-r..=r).flat_map(move |dx| (-r..=r).map(move |dz| self.offset(dx, dz)))
    }
}

/// Convert a world position to the unit containing it, clamped to the world border
pub fn world_to_unit(pos: Vec3) -> UnitPos {
    let axis = |v: f32| {
        ((v / UNIT_SIZE as f32).floor() as i32).clamp(-MAX_UNIT_COORD, MAX_UNIT_COORD)
    };
    UnitPos::new(axis(pos.x), axis(pos.z))
}

/// Column index for local (x, z) within a unit: `x * 16 + z`
pub fn column_index(local_x: u8, local_z: u8) -> usize {
    local_x as usize * UNIT_SIZE as usize + local_z as usize
}

/// Named realm a unit belongs to
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Dimension {
    Overworld,
    Nether,
    End,
    /// Unrecognized realm, kept as the host's raw identifier
    Other(String),
}

impl Dimension {
    /// Classify a host realm identifier (e.g. `minecraft:the_nether`).
    /// Checked in order overworld, nether, end; first substring match wins.
    pub fn from_realm(realm: &str) -> Self {
        if realm.contains("overworld") {
            Dimension::Overworld
        } else if realm.contains("nether") {
            Dimension::Nether
        } else if realm.contains("end") {
            Dimension::End
        } else {
            Dimension::Other(realm.to_string())
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Dimension::Overworld => "overworld",
            Dimension::Nether => "nether",
            Dimension::End => "end",
            Dimension::Other(raw) => raw,
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Dimension {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Dimension {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Dimension::from_realm(&raw))
    }
}

/// One unit in one realm. Immutable once created.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SpatialUnit {
    pub pos: UnitPos,
    pub dimension: Dimension,
}

impl SpatialUnit {
    pub fn new(pos: UnitPos, dimension: Dimension) -> Self {
        Self { pos, dimension }
    }

    pub fn key(&self) -> UnitKey {
        UnitKey::new(&self.dimension, self.pos)
    }
}

/// Identity of a unit for dedup and storage: `"{dimension}_{x}_{z}"`
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey(String);

impl UnitKey {
    pub fn new(dimension: &Dimension, pos: UnitPos) -> Self {
        Self(format!("{}_{}_{}", dimension, pos.x, pos.z))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
