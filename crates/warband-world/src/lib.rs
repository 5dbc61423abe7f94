//! Terrain, mobility, pathing, and static definitions for the Warband engine.
//!
//! This crate models everything the decision engine reads but never
//! writes: terrain classification over the external oracle, group
//! traversal capability, bounded line pathing, the tick-scoped chunk cache
//! and the contracts of the external store and scan provider.
//!
//! # Modules
//!
//! - [`chunk`] -- [`ChunkCache`] plus the [`ChunkStore`],
//!   [`WorldScanProvider`] and [`MonsterRoster`] contracts.
//! - [`error`] -- Error types for world reads.
//! - [`mobility`] -- Land/water/flight traversal from a `motion` set.
//! - [`path`] -- Bresenham pathing that stops at incompatible terrain.
//! - [`structure`] -- Structure and inner-building blueprints, upgrade
//!   costs, and level features.
//! - [`terrain`] -- The [`TerrainOracle`] contract and water test.

pub mod chunk;
pub mod error;
pub mod mobility;
pub mod path;
pub mod structure;
pub mod terrain;

// Re-export primary types at crate root.
pub use chunk::{
    ChunkCache, ChunkStore, GroupLocation, MonsterRoster, WorldScanProvider, chunk_keys_around,
};
pub use error::WorldError;
pub use mobility::Mobility;
pub use path::{PathResult, compute_path};
pub use structure::{
    BuildingBlueprint, MAX_BUILDING_LEVEL, MAX_STRUCTURE_LEVEL, StructureBlueprint, blueprint,
    building_blueprint, building_upgrade_cost, feature_for_level, features_up_to,
    structure_upgrade_cost,
};
pub use terrain::{Biome, StaticTerrain, TerrainData, TerrainOracle, WATER_THRESHOLD};
