//! Terrain oracle contract and water classification.
//!
//! The terrain generator is an external black box: given a tile it returns
//! biome and continuous noise values, deterministically per world seed.
//! This module only classifies that output.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use warband_types::TileCoord;

/// River or lake values above this make a tile water.
pub const WATER_THRESHOLD: f64 = 0.2;

/// Biome descriptor returned by the terrain oracle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Biome {
    /// Biome label, e.g. `plains` or `ocean`.
    pub name: String,
    /// Whether the biome itself is water.
    #[serde(default)]
    pub water: bool,
}

/// Terrain sample for one tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TerrainData {
    /// Biome at the tile.
    pub biome: Biome,
    /// River noise in `[0, 1]`.
    #[serde(default)]
    pub river_value: f64,
    /// Lake noise in `[0, 1]`.
    #[serde(default)]
    pub lake_value: f64,
    /// Elevation in `[0, 1]`.
    #[serde(default)]
    pub height: f64,
    /// Moisture in `[0, 1]`.
    #[serde(default)]
    pub moisture: f64,
}

impl TerrainData {
    /// Dry land of the named biome with neutral noise values.
    pub fn land(biome: &str) -> Self {
        Self {
            biome: Biome {
                name: String::from(biome),
                water: false,
            },
            river_value: 0.0,
            lake_value: 0.0,
            height: 0.5,
            moisture: 0.5,
        }
    }

    /// Open water of the named biome.
    pub fn water(biome: &str) -> Self {
        Self {
            biome: Biome {
                name: String::from(biome),
                water: true,
            },
            river_value: 0.0,
            lake_value: 0.0,
            height: 0.1,
            moisture: 1.0,
        }
    }

    /// Water iff the biome is water or the river or lake value exceeds
    /// [`WATER_THRESHOLD`].
    pub fn is_water(&self) -> bool {
        self.biome.water || self.river_value > WATER_THRESHOLD || self.lake_value > WATER_THRESHOLD
    }
}

/// The external terrain generator. Must be pure and deterministic.
pub trait TerrainOracle {
    /// Sample the terrain at a tile.
    fn terrain_at(&self, x: i32, y: i32) -> TerrainData;

    /// Sample the terrain at a coordinate.
    fn terrain(&self, at: TileCoord) -> TerrainData {
        self.terrain_at(at.x, at.y)
    }

    /// Whether the tile at `at` is water.
    fn is_water(&self, at: TileCoord) -> bool {
        self.terrain(at).is_water()
    }
}

/// A fixed terrain map: one default sample everywhere plus per-tile
/// overrides. Useful for seeded scenarios and small hand-made worlds.
#[derive(Debug, Clone)]
pub struct StaticTerrain {
    default: TerrainData,
    overrides: BTreeMap<TileCoord, TerrainData>,
}

impl StaticTerrain {
    /// All tiles are `default` until overridden.
    pub const fn new(default: TerrainData) -> Self {
        Self {
            default,
            overrides: BTreeMap::new(),
        }
    }

    /// Plains everywhere.
    pub fn all_land() -> Self {
        Self::new(TerrainData::land("plains"))
    }

    /// Ocean everywhere.
    pub fn all_water() -> Self {
        Self::new(TerrainData::water("ocean"))
    }

    /// Override one tile.
    pub fn set(&mut self, at: TileCoord, data: TerrainData) {
        self.overrides.insert(at, data);
    }

    /// Builder form of [`StaticTerrain::set`] marking tiles as lake water.
    #[must_use]
    pub fn with_water(mut self, tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        for at in tiles {
            self.set(at, TerrainData::water("lake"));
        }
        self
    }

    /// Builder form of [`StaticTerrain::set`] marking tiles as dry land.
    #[must_use]
    pub fn with_land(mut self, tiles: impl IntoIterator<Item = TileCoord>) -> Self {
        for at in tiles {
            self.set(at, TerrainData::land("shore"));
        }
        self
    }
}

impl TerrainOracle for StaticTerrain {
    fn terrain_at(&self, x: i32, y: i32) -> TerrainData {
        self.overrides
            .get(&TileCoord::new(x, y))
            .unwrap_or(&self.default)
            .clone()
    }
}
