//! Host interface - what the collector needs from the process that owns the world.

use glam::Vec3;

use crate::world::unit::{UnitPos, world_to_unit};

/// Read access to one realm's terrain. Calls are synchronous and bounded.
pub trait TerrainAccess {
    /// Whether the unit's voxel data is resident and may be queried
    fn is_unit_loaded(&self, pos: UnitPos) -> bool;

    /// World y of the topmost non-empty voxel in the column at local (x, z)
    fn surface_height(&self, pos: UnitPos, local_x: u8, local_z: u8) -> i32;

    /// Material name at an absolute position, or `None` for an empty voxel
    fn material_at(&self, x: i32, y: i32, z: i32) -> Option<&str>;
}

/// An active observer the collector samples around
#[derive(Clone, Debug, PartialEq)]
pub struct Observer {
    pub name: String,
    /// World position in blocks
    pub position: Vec3,
    /// Host realm identifier, e.g. `minecraft:overworld`
    pub realm: String,
    /// Per-observer view radius in units; falls back to the host's global radius
    pub view_radius: Option<u32>,
}

impl Observer {
    pub fn new(name: impl Into<String>, position: Vec3, realm: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position,
            realm: realm.into(),
            view_radius: None,
        }
    }

    pub fn with_view_radius(mut self, radius: u32) -> Self {
        self.view_radius = Some(radius);
        self
    }

    /// Unit the observer currently stands in
    pub fn unit(&self) -> UnitPos {
        world_to_unit(self.position)
    }
}

/// The host process, queried once per tick.
pub trait WorldHost {
    /// Observers active this tick
    fn observers(&self) -> Vec<Observer>;

    /// Global view radius in units
    fn view_radius(&self) -> u32;

    /// Terrain of a realm, if the host knows it
    fn terrain(&self, realm: &str) -> Option<&dyn TerrainAccess>;
}
