//! Column encoder - reduces a unit's voxel columns to the compact wire form.

use serde::Serialize;

use crate::core::config::{CollectorConfig, EncodingMode};
use crate::sampling::material::MaterialTable;
use crate::world::host::TerrainAccess;
use crate::world::unit::{COLUMNS_PER_UNIT, Dimension, SpatialUnit, UNIT_SIZE, UnitKey, UnitPos, column_index};

/// One occupied voxel in the voxel-list encoding
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct VoxelRecord {
    /// Local x within the unit (0-15)
    pub x: u8,
    /// Absolute y
    pub y: i16,
    /// Local z within the unit (0-15)
    pub z: u8,
    #[serde(rename = "type")]
    pub material: u8,
}

/// Column payload of an encoded unit. The variants are alternative wire
/// formats; a collector only ever produces one of them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColumnData {
    /// 256 (height, material) pairs indexed by `x * 16 + z`
    Surface {
        #[serde(rename = "heightMap")]
        height_map: Vec<i16>,
        #[serde(rename = "blockIds")]
        block_ids: Vec<u8>,
    },
    /// Occupied voxels in the sampled band, column by column
    Voxels { blocks: Vec<VoxelRecord> },
}

/// A sampled unit as stored and exported
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedUnit {
    pub chunk_x: i32,
    pub chunk_z: i32,
    pub dimension: Dimension,
    #[serde(flatten)]
    pub columns: ColumnData,
}

impl EncodedUnit {
    pub fn pos(&self) -> UnitPos {
        UnitPos::new(self.chunk_x, self.chunk_z)
    }

    pub fn key(&self) -> UnitKey {
        UnitKey::new(&self.dimension, self.pos())
    }
}

/// Encodes units in the configured representation
#[derive(Clone, Debug)]
pub struct ColumnEncoder {
    mode: EncodingMode,
    materials: MaterialTable,
    voxel_floor: i32,
    voxel_margin: i32,
    world_ceiling: i32,
}

impl ColumnEncoder {
    pub fn new(config: &CollectorConfig) -> Self {
        Self {
            mode: config.encoding,
            materials: config.material_table(),
            voxel_floor: config.voxel_floor,
            voxel_margin: config.voxel_margin,
            world_ceiling: config.world_ceiling,
        }
    }

    pub fn mode(&self) -> EncodingMode {
        self.mode
    }

    /// Encode a loaded unit.
    ///
    /// Returns `None` when the voxel-list encoding finds nothing in the band;
    /// an all-air unit is not worth storing.
    pub fn encode(&self, unit: &SpatialUnit, terrain: &dyn TerrainAccess) -> Option<EncodedUnit> {
        let columns = match self.mode {
            EncodingMode::Surface => self.encode_surface(unit.pos, terrain),
            EncodingMode::Voxels => self.encode_voxels(unit.pos, terrain)?,
        };

        Some(EncodedUnit {
            chunk_x: unit.pos.x,
            chunk_z: unit.pos.z,
            dimension: unit.dimension.clone(),
            columns,
        })
    }

    fn encode_surface(&self, pos: UnitPos, terrain: &dyn TerrainAccess) -> ColumnData {
        let mut height_map = vec![0i16; COLUMNS_PER_UNIT];
        let mut block_ids = vec![MaterialTable::UNKNOWN; COLUMNS_PER_UNIT];

        for (lx, lz) in local_columns() {
            let height = terrain.surface_height(pos, lx, lz);
            let x = pos.origin_x().saturating_add(lx as i32);
            let z = pos.origin_z().saturating_add(lz as i32);

            // At the surface, or just below it if the host reports the first empty row
            let material = terrain
                .material_at(x, height, z)
                .or_else(|| terrain.material_at(x, height - 1, z));

            let i = column_index(lx, lz);
            height_map[i] = clamp_height(height);
            block_ids[i] = material.map_or(MaterialTable::UNKNOWN, |name| self.materials.code(name));
        }

        ColumnData::Surface { height_map, block_ids }
    }

    fn encode_voxels(&self, pos: UnitPos, terrain: &dyn TerrainAccess) -> Option<ColumnData> {
        let mut blocks = Vec::new();

        for (lx, lz) in local_columns() {
            let surface = terrain.surface_height(pos, lx, lz);
            let top = self.world_ceiling.min(surface.saturating_add(self.voxel_margin));
            let x = pos.origin_x().saturating_add(lx as i32);
            let z = pos.origin_z().saturating_add(lz as i32);

            for y in self.voxel_floor..=top {
                if let Some(name) = terrain.material_at(x, y, z) {
                    blocks.push(VoxelRecord {
                        x: lx,
                        y: clamp_height(y),
                        z: lz,
                        material: self.materials.code(name),
                    });
                }
            }
        }

        if blocks.is_empty() {
            None
        } else {
            Some(ColumnData::Voxels { blocks })
        }
    }
}

/// Local (x, z) pairs in index order
fn local_columns() -> impl Iterator<Item = (u8, u8)> {
    let size = UNIT_SIZE as u8;
    (0..size).flat_map(move |x| (0..size).map(move |z| (x, z)))
}

fn clamp_height(y: i32) -> i16 {
    y.clamp(i16::MIN as i32, i16::MAX as i32) as i16
}
