//! The read-only inputs every decision sees.

use chrono::{DateTime, Utc};

use warband_types::{Group, TileCoord, WorldScan};
use warband_world::{ChunkCache, Mobility, TerrainOracle};

use crate::config::AiConfig;
use crate::personality::{PersonalityWeights, weights};

/// Tick-scoped snapshot handed to decision functions. Nothing in it is
/// mutated while a tick is being evaluated.
pub struct DecisionContext<'a> {
    /// Chunks loaded for this tick.
    pub chunks: &'a ChunkCache,
    /// Points of interest around the acting group.
    pub scan: &'a WorldScan,
    /// The external terrain generator.
    pub terrain: &'a dyn TerrainOracle,
    /// Decision tunables.
    pub config: &'a AiConfig,
    /// Tick timestamp.
    pub now: DateTime<Utc>,
}

impl DecisionContext<'_> {
    /// Weight table of the group's archetype.
    pub fn weights_for(&self, group: &Group) -> PersonalityWeights {
        weights(group.personality())
    }

    /// Whether `group` may stand on `at`.
    pub fn can_enter(&self, group: &Group, at: TileCoord) -> bool {
        Mobility::of(group).can_enter(self.terrain, at)
    }

    /// Biome label at `at`, preferring the cached tile label.
    pub fn biome_at(&self, at: TileCoord) -> String {
        self.chunks
            .tile(at)
            .and_then(|t| t.biome.clone())
            .unwrap_or_else(|| self.terrain.terrain(at).biome.name)
    }
}
