//! Procedural demo host - noise terrain in three realms with walking observers.
//!
//! Stands in for a real game server when running the `chunkmap` binary.

use std::collections::HashSet;

use glam::Vec3;
use noise::{Fbm, MultiFractal, NoiseFn, Perlin};

use crate::core::config::DemoConfig;
use crate::world::host::{Observer, TerrainAccess, WorldHost};
use crate::world::unit::{Dimension, UnitPos, world_to_unit};

/// Lowest voxel row of every realm
pub const WORLD_FLOOR: i32 = -64;

/// Realm identifiers the demo host exposes
pub const REALMS: [&str; 3] = ["minecraft:overworld", "minecraft:the_nether", "minecraft:the_end"];

/// Parameters controlling one realm's terrain
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub seed: u32,
    pub scale: f32,        // Horizontal scale (larger = smoother)
    pub base_height: f32,  // Height at noise value -1
    pub height_scale: f32, // Vertical range above base
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub sea_level: i32,    // Fluid fills up to here
}

impl TerrainParams {
    fn for_dimension(dimension: &Dimension, seed: u32) -> Self {
        match dimension {
            Dimension::Nether => Self {
                seed: seed.wrapping_add(1),
                scale: 60.0,
                base_height: 40.0,
                height_scale: 50.0,
                octaves: 3,
                persistence: 0.6,
                lacunarity: 2.0,
                sea_level: 31,
            },
            Dimension::End => Self {
                seed: seed.wrapping_add(2),
                scale: 80.0,
                base_height: 40.0,
                height_scale: 40.0,
                octaves: 2,
                persistence: 0.5,
                lacunarity: 2.0,
                sea_level: WORLD_FLOOR,
            },
            _ => Self {
                seed,
                scale: 150.0,
                base_height: 48.0,
                height_scale: 64.0,
                octaves: 5,
                persistence: 0.5,
                lacunarity: 2.0,
                sea_level: 62,
            },
        }
    }
}

/// Terrain of one realm plus the set of currently loaded units
pub struct RealmTerrain {
    dimension: Dimension,
    params: TerrainParams,
    noise: Fbm<Perlin>,
    loaded: HashSet<UnitPos>,
}

impl RealmTerrain {
    pub fn new(dimension: Dimension, params: TerrainParams) -> Self {
        let noise = Fbm::<Perlin>::new(params.seed)
            .set_octaves(params.octaves as usize)
            .set_persistence(params.persistence as f64)
            .set_lacunarity(params.lacunarity as f64);

        Self {
            dimension,
            params,
            noise,
            loaded: HashSet::new(),
        }
    }

    fn noise_at(&self, x: i32, z: i32) -> f64 {
        let nx = (x as f32 / self.params.scale) as f64;
        let nz = (z as f32 / self.params.scale) as f64;
        self.noise.get([nx, nz])
    }

    /// Solid ground height at (x, z), or None where the column is empty
    /// (gaps between end islands).
    pub fn ground_height(&self, x: i32, z: i32) -> Option<i32> {
        let n = self.noise_at(x, z);
        if self.dimension == Dimension::End && n < 0.0 {
            return None;
        }
        let normalized = (n + 1.0) / 2.0;
        Some((self.params.base_height as f64 + normalized * self.params.height_scale as f64) as i32)
    }

    pub fn mark_loaded(&mut self, pos: UnitPos) {
        self.loaded.insert(pos);
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded.len()
    }

    fn fluid(&self) -> &'static str {
        match self.dimension {
            Dimension::Nether => "lava",
            _ => "water",
        }
    }

    fn solid_at(&self, y: i32, ground: i32) -> &'static str {
        let sea = self.params.sea_level;
        if y <= WORLD_FLOOR + 1 {
            return "bedrock";
        }
        match self.dimension {
            Dimension::Nether => {
                if y == ground && ground <= sea + 2 {
                    "soul_sand"
                } else if y > ground - 3 && ground > 70 {
                    "gravel"
                } else {
                    "netherrack"
                }
            }
            Dimension::End => "end_stone",
            _ => {
                let depth = ground - y;
                if ground <= sea + 1 {
                    if depth < 3 { "sand" } else { "stone" }
                } else if depth == 0 {
                    if ground > 100 { "snow" } else { "grass_block" }
                } else if depth < 4 {
                    "dirt"
                } else {
                    "stone"
                }
            }
        }
    }
}

impl TerrainAccess for RealmTerrain {
    fn is_unit_loaded(&self, pos: UnitPos) -> bool {
        self.loaded.contains(&pos)
    }

    fn surface_height(&self, pos: UnitPos, local_x: u8, local_z: u8) -> i32 {
        let x = pos.origin_x() + local_x as i32;
        let z = pos.origin_z() + local_z as i32;
        match self.ground_height(x, z) {
            Some(ground) => ground.max(self.params.sea_level),
            None => WORLD_FLOOR,
        }
    }

    fn material_at(&self, x: i32, y: i32, z: i32) -> Option<&str> {
        let ground = self.ground_height(x, z)?;
        if y <= ground {
            Some(self.solid_at(y, ground))
        } else if y <= self.params.sea_level {
            Some(self.fluid())
        } else {
            None
        }
    }
}

/// An observer walking a circle around its realm's origin
struct Walker {
    name: String,
    realm: usize,
    radius: f32,
    phase: f32,
}

/// World host backed by procedural terrain
pub struct DemoWorld {
    config: DemoConfig,
    realms: Vec<(String, RealmTerrain)>,
    walkers: Vec<Walker>,
    tick: u64,
}

impl DemoWorld {
    pub fn new(config: DemoConfig) -> Self {
        let realms = REALMS
            .iter()
            .map(|id| {
                let dimension = Dimension::from_realm(id);
                let params = TerrainParams::for_dimension(&dimension, config.seed);
                (id.to_string(), RealmTerrain::new(dimension, params))
            })
            .collect();

        let walkers = (0..config.observers)
            .map(|i| Walker {
                name: format!("observer-{}", i),
                realm: i as usize % REALMS.len(),
                radius: 96.0 + 64.0 * i as f32,
                phase: i as f32 * 1.7,
            })
            .collect();

        let mut world = Self {
            config,
            realms,
            walkers,
            tick: 0,
        };
        world.refresh_loaded();
        world
    }

    /// Advance the simulation by one host tick
    pub fn step(&mut self) {
        self.tick += 1;
        self.refresh_loaded();
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    fn walker_position(&self, walker: &Walker) -> Vec3 {
        let distance = self.tick as f32 * self.config.walk_speed;
        let angle = walker.phase + distance / walker.radius;
        Vec3::new(angle.cos() * walker.radius, 80.0, angle.sin() * walker.radius)
    }

    /// Load every unit within `load_radius` of an observer. Loaded units
    /// stay loaded, like a server that never unloads.
    fn refresh_loaded(&mut self) {
        let centers: Vec<(usize, UnitPos)> = self
            .walkers
            .iter()
            .map(|w| (w.realm, world_to_unit(self.walker_position(w))))
            .collect();

        for (realm, center) in centers {
            let terrain = &mut self.realms[realm].1;
            for pos in center.neighborhood(self.config.load_radius) {
                terrain.mark_loaded(pos);
            }
        }
    }

    /// Total loaded units across realms
    pub fn loaded_units(&self) -> usize {
        self.realms.iter().map(|(_, t)| t.loaded_count()).sum()
    }
}

impl WorldHost for DemoWorld {
    fn observers(&self) -> Vec<Observer> {
        self.walkers
            .iter()
            .map(|w| Observer::new(w.name.clone(), self.walker_position(w), self.realms[w.realm].0.clone()))
            .collect()
    }

    fn view_radius(&self) -> u32 {
        self.config.view_radius
    }

    fn terrain(&self, realm: &str) -> Option<&dyn TerrainAccess> {
        self.realms
            .iter()
            .find(|(id, _)| id == realm)
            .map(|(_, terrain)| terrain as &dyn TerrainAccess)
    }
}
