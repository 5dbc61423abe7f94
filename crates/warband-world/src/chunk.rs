//! Chunk cache and the store/scan provider contracts.
//!
//! The tick driver resolves every external read up front: it asks the
//! [`ChunkStore`] for the chunks around each group and the
//! [`WorldScanProvider`] for a scan. Decisions then run against the
//! immutable [`ChunkCache`] and never perform I/O.

use std::collections::BTreeMap;

use tracing::debug;

use warband_types::{Battle, Chunk, Group, GroupId, Structure, TileCoord, TileData, WorldScan};

use crate::error::WorldError;

/// Source of persisted chunk data.
pub trait ChunkStore {
    /// Load the chunk stored under `key` (`"cx,cy"`). A chunk that was
    /// never written loads as empty.
    fn load_chunk(&self, key: &str) -> Result<Chunk, WorldError>;
}

/// Source of per-group world scans.
pub trait WorldScanProvider {
    /// Scan points of interest around `center`.
    fn scan(&self, world_id: &str, center: TileCoord) -> Result<WorldScan, WorldError>;
}

/// Where a monster group was last stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct GroupLocation {
    /// The group.
    pub id: GroupId,
    /// Tile it stands on.
    pub at: TileCoord,
}

/// Index of the monster groups a tick must evaluate.
pub trait MonsterRoster {
    /// Every monster group with its tile, in a stable order.
    fn monster_groups(&self) -> Result<Vec<GroupLocation>, WorldError>;
}

/// Tick-scoped, read-only cache of loaded chunks.
#[derive(Debug, Clone, Default)]
pub struct ChunkCache {
    chunks: BTreeMap<String, Chunk>,
}

impl ChunkCache {
    /// An empty cache.
    pub const fn new() -> Self {
        Self {
            chunks: BTreeMap::new(),
        }
    }

    /// Insert (or replace) a chunk.
    pub fn insert(&mut self, key: String, chunk: Chunk) {
        self.chunks.insert(key, chunk);
    }

    /// Whether the chunk is loaded.
    pub fn contains(&self, key: &str) -> bool {
        self.chunks.contains_key(key)
    }

    /// Number of loaded chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Load every chunk within `radius` tiles of `center` that is not yet
    /// cached.
    pub fn load_around(
        &mut self,
        store: &dyn ChunkStore,
        center: TileCoord,
        radius: i32,
    ) -> Result<(), WorldError> {
        for key in chunk_keys_around(center, radius) {
            if self.contains(&key) {
                continue;
            }
            let chunk = store.load_chunk(&key)?;
            debug!(chunk = %key, tiles = chunk.len(), "Chunk loaded");
            self.insert(key, chunk);
        }
        Ok(())
    }

    /// Tile data at `at`, if its chunk is loaded and the tile is stored.
    pub fn tile(&self, at: TileCoord) -> Option<&TileData> {
        self.chunks.get(&at.chunk_key())?.get(&at.tile_key())
    }

    /// Groups on a tile (empty when unknown).
    pub fn groups_at(&self, at: TileCoord) -> impl Iterator<Item = &Group> {
        self.tile(at).into_iter().flat_map(|t| t.groups.values())
    }

    /// The structure on a tile.
    pub fn structure_at(&self, at: TileCoord) -> Option<&Structure> {
        self.tile(at)?.structure.as_ref()
    }

    /// A group by id on a known tile.
    pub fn group(&self, at: TileCoord, id: GroupId) -> Option<&Group> {
        self.tile(at)?.groups.get(&id)
    }

    /// Battles on a tile (empty when unknown).
    pub fn battles_at(&self, at: TileCoord) -> impl Iterator<Item = &Battle> {
        self.tile(at).into_iter().flat_map(|t| t.battles.values())
    }

    /// Every stored tile with its coordinate. Tiles with unparsable keys
    /// are skipped.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &TileData)> {
        self.chunks.values().flat_map(|chunk| {
            chunk
                .iter()
                .filter_map(|(key, tile)| TileCoord::parse_tile_key(key).map(|c| (c, tile)))
        })
    }

    /// Structures on stored tiles within euclidean `radius` of `center`.
    pub fn structures_within(
        &self,
        center: TileCoord,
        radius: f64,
    ) -> impl Iterator<Item = &Structure> {
        self.tiles()
            .filter(move |(at, _)| center.distance(*at) <= radius)
            .filter_map(|(_, tile)| tile.structure.as_ref())
    }
}

/// Keys of every chunk overlapping the square of `radius` tiles around
/// `center`.
pub fn chunk_keys_around(center: TileCoord, radius: i32) -> Vec<String> {
    let radius = radius.max(0);
    let (min_cx, min_cy) = center.offset(radius.saturating_neg(), radius.saturating_neg()).chunk();
    let (max_cx, max_cy) = center.offset(radius, radius).chunk();
    let mut keys = Vec::new();
    for cx in min_cx..=max_cx {
        for cy in min_cy..=max_cy {
            keys.push(format!("{cx},{cy}"));
        }
    }
    keys
}
