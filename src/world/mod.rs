//! World model: spatial units and the host interface

pub mod unit;
pub mod host;
pub mod demo;

pub use unit::{
    Dimension, SpatialUnit, UnitKey, UnitPos,
    world_to_unit, column_index, UNIT_SIZE, COLUMNS_PER_UNIT,
};
pub use host::{Observer, TerrainAccess, WorldHost};
pub use demo::DemoWorld;
