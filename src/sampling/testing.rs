//! Test fixtures: flat terrain and a scripted host.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::world::host::{Observer, TerrainAccess, WorldHost};
use crate::world::unit::{UNIT_SIZE, UnitPos};

/// Height reported for columns with no ground
pub const EMPTY_SURFACE: i32 = -64;

/// Terrain that is solid up to a fixed height, with optional per-column overrides
pub struct FlatTerrain {
    ground: Option<(i32, &'static str)>,
    columns: HashMap<(i32, i32), (i32, &'static str)>,
    surface_offset: i32,
    /// `None` means every unit is loaded
    loaded: Option<HashSet<UnitPos>>,
    /// Units whose first column was queried, once per encode
    encoded: RefCell<Vec<UnitPos>>,
}

impl FlatTerrain {
    pub fn new(height: i32, material: &'static str) -> Self {
        Self {
            ground: Some((height, material)),
            columns: HashMap::new(),
            surface_offset: 0,
            loaded: None,
            encoded: RefCell::new(Vec::new()),
        }
    }

    /// All-air terrain
    pub fn empty() -> Self {
        Self {
            ground: None,
            ..Self::new(0, "air")
        }
    }

    /// Override one local column in every unit
    pub fn with_column(mut self, lx: i32, lz: i32, height: i32, material: &'static str) -> Self {
        self.columns.insert((lx, lz), (height, material));
        self
    }

    /// Report surface heights this many rows above the ground
    pub fn with_surface_offset(mut self, offset: i32) -> Self {
        self.surface_offset = offset;
        self
    }

    /// Only these units are loaded
    pub fn with_loaded(mut self, units: impl IntoIterator<Item = UnitPos>) -> Self {
        self.loaded = Some(units.into_iter().collect());
        self
    }

    pub fn load(&mut self, pos: UnitPos) {
        if let Some(loaded) = &mut self.loaded {
            loaded.insert(pos);
        }
    }

    /// Units encoded so far, in order, with repeats
    pub fn encoded_units(&self) -> Vec<UnitPos> {
        self.encoded.borrow().clone()
    }

    fn column(&self, x: i32, z: i32) -> Option<(i32, &'static str)> {
        let local = (x.rem_euclid(UNIT_SIZE), z.rem_euclid(UNIT_SIZE));
        self.columns.get(&local).copied().or(self.ground)
    }
}

impl TerrainAccess for FlatTerrain {
    fn is_unit_loaded(&self, pos: UnitPos) -> bool {
        self.loaded.as_ref().is_none_or(|loaded| loaded.contains(&pos))
    }

    fn surface_height(&self, pos: UnitPos, local_x: u8, local_z: u8) -> i32 {
        if local_x == 0 && local_z == 0 {
            self.encoded.borrow_mut().push(pos);
        }
        let x = pos.origin_x().saturating_add(local_x as i32);
        let z = pos.origin_z().saturating_add(local_z as i32);
        match self.column(x, z) {
            Some((height, _)) => height + self.surface_offset,
            None => EMPTY_SURFACE,
        }
    }

    fn material_at(&self, x: i32, y: i32, z: i32) -> Option<&str> {
        let (height, material) = self.column(x, z)?;
        (y <= height).then_some(material)
    }
}

/// Host with a fixed observer list and named flat realms
pub struct TestHost {
    pub observers: Vec<Observer>,
    pub view_radius: u32,
    pub realms: HashMap<String, FlatTerrain>,
}

impl TestHost {
    pub fn new(view_radius: u32) -> Self {
        Self {
            observers: Vec::new(),
            view_radius,
            realms: HashMap::new(),
        }
    }

    pub fn with_realm(mut self, realm: &str, terrain: FlatTerrain) -> Self {
        self.realms.insert(realm.to_string(), terrain);
        self
    }

    pub fn with_observer(mut self, observer: Observer) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn realm(&self, realm: &str) -> &FlatTerrain {
        &self.realms[realm]
    }

    pub fn realm_mut(&mut self, realm: &str) -> &mut FlatTerrain {
        self.realms.get_mut(realm).expect("realm registered")
    }
}

impl WorldHost for TestHost {
    fn observers(&self) -> Vec<Observer> {
        self.observers.clone()
    }

    fn view_radius(&self) -> u32 {
        self.view_radius
    }

    fn terrain(&self, realm: &str) -> Option<&dyn TerrainAccess> {
        self.realms.get(realm).map(|t| t as &dyn TerrainAccess)
    }
}
