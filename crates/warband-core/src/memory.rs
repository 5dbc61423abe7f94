//! An in-memory world backing every collaborator contract.
//!
//! [`InMemoryWorld`] stores chunks exactly as the realtime store would
//! (chunk key to tile key to tile data) and serves as chunk store, scan
//! provider, monster roster and mutation sink at once. The engine binary
//! runs on it and the integration tests build scenarios with it.

use std::collections::BTreeMap;

use tracing::debug;

use warband_ai::power::group_power;
use warband_types::{
    Battle, ChatMessage, Chunk, Group, GroupId, Mutation, MutationBatch, ResourceHotspot,
    ScannedGroup, ScannedStructure, Structure, StructureKind, StructureSummary, TileCoord,
    TileData, WorldScan,
};
use warband_world::{ChunkStore, GroupLocation, MonsterRoster, WorldError, WorldScanProvider};

use crate::sink::{CommitError, MutationSink};

/// Chunks, chat and commit count of one world, held in memory.
#[derive(Debug, Clone)]
pub struct InMemoryWorld {
    world_id: String,
    scan_radius: f64,
    chunks: BTreeMap<String, Chunk>,
    chat: Vec<ChatMessage>,
    commits: u64,
}

impl InMemoryWorld {
    /// An empty world scanned out to `scan_radius` tiles.
    pub fn new(world_id: impl Into<String>, scan_radius: f64) -> Self {
        Self {
            world_id: world_id.into(),
            scan_radius,
            chunks: BTreeMap::new(),
            chat: Vec::new(),
            commits: 0,
        }
    }

    /// Store identifier of this world.
    pub fn world_id(&self) -> &str {
        &self.world_id
    }

    /// Tile data at `at`, if stored.
    pub fn tile(&self, at: TileCoord) -> Option<&TileData> {
        self.chunks.get(&at.chunk_key())?.get(&at.tile_key())
    }

    /// Mutable tile data at `at`, created empty when missing.
    pub fn tile_mut(&mut self, at: TileCoord) -> &mut TileData {
        self.chunks
            .entry(at.chunk_key())
            .or_default()
            .entry(at.tile_key())
            .or_default()
    }

    /// Every stored tile with its coordinate.
    pub fn tiles(&self) -> impl Iterator<Item = (TileCoord, &TileData)> {
        self.chunks.values().flat_map(|chunk| {
            chunk
                .iter()
                .filter_map(|(key, tile)| TileCoord::parse_tile_key(key).map(|c| (c, tile)))
        })
    }

    /// Place a group on its tile.
    pub fn put_group(&mut self, group: Group) {
        self.tile_mut(group.coord()).groups.insert(group.id, group);
    }

    /// Place a structure on its tile.
    pub fn put_structure(&mut self, structure: Structure) {
        let at = structure.coord();
        self.tile_mut(at).structure = Some(structure);
    }

    /// Place a battle on its tile.
    pub fn put_battle(&mut self, battle: Battle) {
        self.tile_mut(battle.coord()).battles.insert(battle.id, battle);
    }

    /// Find a group anywhere in the world.
    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.tiles().find_map(|(_, tile)| tile.groups.get(&id))
    }

    /// Every stored group.
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.tiles().flat_map(|(_, tile)| tile.groups.values())
    }

    /// Every stored structure.
    pub fn structures(&self) -> impl Iterator<Item = &Structure> {
        self.tiles().filter_map(|(_, tile)| tile.structure.as_ref())
    }

    /// Every stored battle.
    pub fn battles(&self) -> impl Iterator<Item = &Battle> {
        self.tiles().flat_map(|(_, tile)| tile.battles.values())
    }

    /// Chat lines in commit order.
    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    /// Number of non-empty batches applied so far.
    pub const fn commit_count(&self) -> u64 {
        self.commits
    }

    fn apply(&mut self, mutation: Mutation) {
        match mutation {
            Mutation::PutGroup(group) => self.put_group(*group),
            Mutation::RemoveGroup { at, group_id } => {
                if let Some(tile) = self
                    .chunks
                    .get_mut(&at.chunk_key())
                    .and_then(|chunk| chunk.get_mut(&at.tile_key()))
                {
                    tile.groups.remove(&group_id);
                }
            }
            Mutation::PutStructure(structure) => self.put_structure(*structure),
            Mutation::PutBattle(battle) => self.put_battle(*battle),
            Mutation::Chat(message) => self.chat.push(message),
        }
    }
}

impl ChunkStore for InMemoryWorld {
    fn load_chunk(&self, key: &str) -> Result<Chunk, WorldError> {
        Ok(self.chunks.get(key).cloned().unwrap_or_default())
    }
}

impl MonsterRoster for InMemoryWorld {
    fn monster_groups(&self) -> Result<Vec<GroupLocation>, WorldError> {
        let mut located: Vec<GroupLocation> = self
            .tiles()
            .flat_map(|(at, tile)| {
                tile.groups
                    .values()
                    .filter(|g| g.is_monster())
                    .map(move |g| GroupLocation { id: g.id, at })
            })
            .collect();
        located.sort();
        Ok(located)
    }
}

impl WorldScanProvider for InMemoryWorld {
    fn scan(&self, world_id: &str, center: TileCoord) -> Result<WorldScan, WorldError> {
        if world_id != self.world_id {
            return Err(WorldError::ScanUnavailable {
                world_id: String::from(world_id),
                center,
                reason: format!("this store holds {}", self.world_id),
            });
        }

        let mut scan = WorldScan::default();
        for (at, tile) in self
            .tiles()
            .filter(|(at, _)| center.distance(*at) <= self.scan_radius)
        {
            if let Some(structure) = &tile.structure {
                let scanned = ScannedStructure {
                    x: at.x,
                    y: at.y,
                    structure: summarize(structure),
                };
                if structure.monster {
                    scan.monster_structures.push(scanned);
                } else if structure.kind == StructureKind::Spawn {
                    scan.player_spawns.push(scanned);
                } else {
                    scan.player_structures.push(scanned);
                }
            }

            scan.resource_hotspots.extend(
                tile.resources
                    .iter()
                    .filter(|r| r.amount > 0)
                    .map(|r| ResourceHotspot {
                        x: at.x,
                        y: at.y,
                        resource: r.code.clone(),
                        amount: r.amount,
                    }),
            );

            scan.monster_groups.extend(
                tile.groups
                    .values()
                    .filter(|g| g.is_monster())
                    .map(|g| ScannedGroup {
                        x: at.x,
                        y: at.y,
                        id: g.id,
                        race: g.race.clone(),
                        unit_count: g.unit_count(),
                        power: group_power(g),
                    }),
            );
        }
        Ok(scan)
    }
}

impl MutationSink for InMemoryWorld {
    fn commit(&mut self, batch: MutationBatch) -> Result<(), CommitError> {
        if batch.is_empty() {
            return Ok(());
        }
        let count = batch.len();
        for mutation in batch {
            self.apply(mutation);
        }
        self.commits = self.commits.saturating_add(1);
        debug!(world_id = %self.world_id, mutations = count, "Batch applied");
        Ok(())
    }
}

fn summarize(structure: &Structure) -> StructureSummary {
    StructureSummary {
        id: structure.id,
        kind: structure.kind,
        level: structure.current_level(),
        defense_power: None,
        health: structure.health,
        max_health: structure.max_health,
        owner: structure.owner_name.clone(),
        monster: structure.monster,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Utc;

    use std::collections::BTreeSet;

    use warband_types::{
        AiMemory, BuildStatus, GroupActivity, GroupOwner, Inventory, ItemCode, PlayerId,
        ResourceDeposit, StructureId, StructureOwner,
    };

    use super::*;

    fn group(at: TileCoord, owner: GroupOwner) -> Group {
        Group {
            id: GroupId::new(),
            name: String::from("Bonegnawers"),
            race: String::from("goblin"),
            owner,
            home_structure: None,
            x: at.x,
            y: at.y,
            units: BTreeMap::new(),
            items: Inventory::default(),
            motion: BTreeSet::new(),
            activity: GroupActivity::Idle,
            personality: None,
            memory: AiMemory::default(),
        }
    }

    #[test]
    fn unknown_chunk_loads_empty() {
        let world = InMemoryWorld::new("w", 10.0);
        assert!(world.load_chunk("5,5").unwrap().is_empty());
    }

    #[test]
    fn roster_lists_only_monsters() {
        let mut world = InMemoryWorld::new("w", 10.0);
        let monster = group(TileCoord::new(3, 3), GroupOwner::Monster);
        let player = group(
            TileCoord::new(3, 3),
            GroupOwner::Player {
                player_id: PlayerId::new(),
            },
        );
        let monster_id = monster.id;
        world.put_group(monster);
        world.put_group(player);

        let roster = world.monster_groups().unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.first().unwrap().id, monster_id);
    }

    #[test]
    fn scan_respects_radius_and_world() {
        let mut world = InMemoryWorld::new("w", 5.0);
        world.tile_mut(TileCoord::new(2, 0)).resources.push(ResourceDeposit {
            code: ItemCode::new("stone"),
            amount: 4,
        });
        world.tile_mut(TileCoord::new(20, 0)).resources.push(ResourceDeposit {
            code: ItemCode::new("stone"),
            amount: 4,
        });
        world.tile_mut(TileCoord::new(1, 0)).resources.push(ResourceDeposit {
            code: ItemCode::new("bone"),
            amount: 0,
        });

        let scan = world.scan("w", TileCoord::new(0, 0)).unwrap();
        assert_eq!(scan.resource_hotspots.len(), 1);
        assert_eq!(scan.resource_hotspots.first().unwrap().x, 2);
        assert!(world.scan("other", TileCoord::new(0, 0)).is_err());
    }

    #[test]
    fn commit_applies_in_order() {
        let mut world = InMemoryWorld::new("w", 5.0);
        let from = TileCoord::new(0, 0);
        let mut g = group(from, GroupOwner::Monster);
        world.put_group(g.clone());

        g.set_coord(TileCoord::new(1, 0));
        let batch: MutationBatch = [
            Mutation::RemoveGroup {
                at: from,
                group_id: g.id,
            },
            Mutation::put_group(g.clone()),
            Mutation::Chat(ChatMessage::event(String::from("moved"), g.coord(), Utc::now())),
        ]
        .into_iter()
        .collect();
        world.commit(batch).unwrap();

        assert_eq!(world.group(g.id).unwrap().coord(), TileCoord::new(1, 0));
        assert!(world.tile(from).unwrap().groups.is_empty());
        assert_eq!(world.chat().len(), 1);
        assert_eq!(world.commit_count(), 1);

        world.commit(MutationBatch::new()).unwrap();
        assert_eq!(world.commit_count(), 1);
    }

    #[test]
    fn structure_writes_land_on_their_tile_and_scan_with_level() {
        let mut world = InMemoryWorld::new("w", 10.0);
        let at = TileCoord::new(3, -2);
        let lair = Structure {
            id: StructureId::new(),
            kind: StructureKind::MonsterLair,
            name: String::from("Den"),
            x: at.x,
            y: at.y,
            owner: StructureOwner::Monster {
                group_id: GroupId::new(),
            },
            owner_name: String::from("Bonegnawers"),
            monster: true,
            level: 3,
            status: BuildStatus::Complete,
            capacity: 10,
            items: Inventory::default(),
            features: BTreeSet::new(),
            buildings: BTreeMap::new(),
            builder: None,
            battle_id: None,
            health: 150,
            max_health: 200,
            monster_friendly: false,
            last_activity: None,
            last_upgraded: None,
        };
        world
            .commit([Mutation::put_structure(lair.clone())].into_iter().collect())
            .unwrap();

        assert_eq!(world.tile(at).unwrap().structure.as_ref(), Some(&lair));
        let scan = world.scan("w", TileCoord::new(0, 0)).unwrap();
        let summary = &scan.monster_structures.first().unwrap().structure;
        assert_eq!(summary.id, lair.id);
        assert_eq!(summary.level, 3);
    }
}
