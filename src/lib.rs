//! chunkmap - samples voxel terrain around observers into a compact,
//! bounded surface map and serves it as JSON

pub mod core;
pub mod world;
pub mod sampling;
