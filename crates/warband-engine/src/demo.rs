//! Demo world seeding.
//!
//! At startup the engine fills an empty [`InMemoryWorld`] with player
//! spawns, player patrols, resource deposits and monster warbands of every
//! archetype, all placed on dry land of the procedural terrain. Placement
//! is driven by the world seed so equal seeds produce equal worlds.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::info;

use warband_core::InMemoryWorld;
use warband_types::{
    AiMemory, BuildStatus, Group, GroupActivity, GroupId, GroupOwner, Inventory, ItemCode, Motion,
    Personality, PlayerId, ResourceDeposit, Structure, StructureId, StructureKind, StructureOwner,
    TileCoord, Unit, UnitId,
};
use warband_world::TerrainOracle;

use crate::error::EngineError;

// -----------------------------------------------------------------------
// Configuration
// -----------------------------------------------------------------------

/// Demo world contents, loaded from the `demo` section of
/// `warband-config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DemoConfig {
    /// Half-width of the square the world is seeded in, in tiles.
    #[serde(default = "default_radius")]
    pub radius: i32,

    /// Number of player spawn points.
    #[serde(default = "default_spawn_points")]
    pub spawn_points: u32,

    /// Player groups patrolling near each spawn.
    #[serde(default = "default_patrols_per_spawn")]
    pub patrols_per_spawn: u32,

    /// Number of monster warbands.
    #[serde(default = "default_monster_groups")]
    pub monster_groups: u32,

    /// Number of tiles carrying resource deposits.
    #[serde(default = "default_resource_tiles")]
    pub resource_tiles: u32,

    /// Monster races; warbands of one race merge and share a faction.
    #[serde(default = "default_races")]
    pub races: Vec<String>,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            radius: default_radius(),
            spawn_points: default_spawn_points(),
            patrols_per_spawn: default_patrols_per_spawn(),
            monster_groups: default_monster_groups(),
            resource_tiles: default_resource_tiles(),
            races: default_races(),
        }
    }
}

const fn default_radius() -> i32 {
    40
}

const fn default_spawn_points() -> u32 {
    2
}

const fn default_patrols_per_spawn() -> u32 {
    2
}

const fn default_monster_groups() -> u32 {
    16
}

const fn default_resource_tiles() -> u32 {
    40
}

fn default_races() -> Vec<String> {
    vec![
        String::from("goblin"),
        String::from("orc"),
        String::from("troll"),
        String::from("lizardfolk"),
    ]
}

/// Races that swim as well as walk.
const AMPHIBIOUS: &[&str] = &["lizardfolk"];

/// Resources scattered over the map.
const RESOURCES: &[&str] = &["WOODEN_STICKS", "STONE", "BONE", "HIDE", "IRON_ORE"];

/// Attempts at finding a dry tile before giving up on one placement.
const PLACEMENT_ATTEMPTS: u32 = 200;

// -----------------------------------------------------------------------
// Seeding
// -----------------------------------------------------------------------

/// Counts of what was placed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    /// Player spawn structures.
    pub spawns: u32,
    /// Player groups.
    pub patrols: u32,
    /// Monster groups.
    pub warbands: u32,
    /// Tiles with deposits.
    pub resource_tiles: u32,
}

/// Populate `world` on dry land of `terrain`.
///
/// # Errors
///
/// Returns [`EngineError::Seeding`] if the configuration cannot produce a
/// world (no races, non-positive radius, or no dry land found).
pub fn seed_world(
    world: &mut InMemoryWorld,
    terrain: &dyn TerrainOracle,
    config: &DemoConfig,
    seed: u64,
    now: DateTime<Utc>,
) -> Result<SeedReport, EngineError> {
    if config.races.is_empty() {
        return Err(EngineError::Seeding {
            message: String::from("demo.races is empty"),
        });
    }
    if config.radius <= 0 {
        return Err(EngineError::Seeding {
            message: format!("demo.radius must be positive, got {}", config.radius),
        });
    }

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut placer = Placer {
        terrain,
        radius: config.radius,
        rng: &mut rng,
    };
    let mut report = SeedReport::default();

    for n in 0..config.spawn_points {
        let at = placer.dry_tile()?;
        world.put_structure(player_spawn(n, at, now));
        report.spawns = report.spawns.saturating_add(1);

        for _ in 0..config.patrols_per_spawn {
            let near = placer.dry_tile_near(at, 3)?;
            let units = placer.rng.random_range(2..=6);
            world.put_group(player_patrol(near, units));
            report.patrols = report.patrols.saturating_add(1);
        }
    }

    for _ in 0..config.resource_tiles {
        let at = placer.dry_tile()?;
        let code = RESOURCES
            .get(placer.rng.random_range(0..RESOURCES.len()))
            .copied()
            .unwrap_or("STONE");
        let amount = placer.rng.random_range(5..=40);
        world.tile_mut(at).resources.push(ResourceDeposit {
            code: ItemCode::new(code),
            amount,
        });
        report.resource_tiles = report.resource_tiles.saturating_add(1);
    }

    for _ in 0..config.monster_groups {
        let race = config
            .races
            .get(placer.rng.random_range(0..config.races.len()))
            .cloned()
            .unwrap_or_default();
        let personality = Personality::ALL
            .get(placer.rng.random_range(0..Personality::ALL.len()))
            .copied()
            .unwrap_or_default();
        let at = placer.dry_tile()?;
        let units = placer.rng.random_range(2..=8);
        let mut items = Inventory::new();
        for code in RESOURCES {
            items.add(ItemCode::new(code), placer.rng.random_range(0..=12));
        }
        world.put_group(warband(race, personality, at, units, items));
        report.warbands = report.warbands.saturating_add(1);
    }

    info!(
        spawns = report.spawns,
        patrols = report.patrols,
        warbands = report.warbands,
        resource_tiles = report.resource_tiles,
        "Demo world seeded"
    );
    Ok(report)
}

struct Placer<'a> {
    terrain: &'a dyn TerrainOracle,
    radius: i32,
    rng: &'a mut SmallRng,
}

impl Placer<'_> {
    fn dry_tile(&mut self) -> Result<TileCoord, EngineError> {
        self.dry_tile_near(TileCoord::new(0, 0), self.radius)
    }

    fn dry_tile_near(&mut self, center: TileCoord, radius: i32) -> Result<TileCoord, EngineError> {
        let radius = radius.max(1);
        let low = radius.saturating_neg();
        for _ in 0..PLACEMENT_ATTEMPTS {
            let at = center.offset(
                self.rng.random_range(low..=radius),
                self.rng.random_range(low..=radius),
            );
            if !self.terrain.is_water(at) {
                return Ok(at);
            }
        }
        Err(EngineError::Seeding {
            message: format!("no dry land within {radius} tiles of {center}"),
        })
    }
}

fn units(kind: &str, count: u32, strength: f64) -> BTreeMap<UnitId, Unit> {
    (0..count)
        .map(|_| (UnitId::new(), Unit::new(kind, strength)))
        .collect()
}

fn player_spawn(n: u32, at: TileCoord, now: DateTime<Utc>) -> Structure {
    Structure {
        id: StructureId::new(),
        kind: StructureKind::Spawn,
        name: format!("Haven {}", n.saturating_add(1)),
        x: at.x,
        y: at.y,
        owner: StructureOwner::Player {
            player_id: PlayerId::new(),
        },
        owner_name: String::from("Settlers"),
        monster: false,
        level: 1,
        status: BuildStatus::Complete,
        capacity: 20,
        items: Inventory::new(),
        features: BTreeSet::new(),
        buildings: BTreeMap::new(),
        builder: None,
        battle_id: None,
        health: 300,
        max_health: 300,
        monster_friendly: false,
        last_activity: Some(now),
        last_upgraded: None,
    }
}

fn player_patrol(at: TileCoord, count: u32) -> Group {
    Group {
        id: GroupId::new(),
        name: String::from("Militia"),
        race: String::from("human"),
        owner: GroupOwner::Player {
            player_id: PlayerId::new(),
        },
        home_structure: None,
        x: at.x,
        y: at.y,
        units: units("militia", count, 1.2),
        items: Inventory::new(),
        motion: BTreeSet::new(),
        activity: GroupActivity::Idle,
        personality: None,
        memory: AiMemory::default(),
    }
}

fn warband(
    race: String,
    personality: Personality,
    at: TileCoord,
    count: u32,
    items: Inventory,
) -> Group {
    let motion = if AMPHIBIOUS.contains(&race.as_str()) {
        BTreeSet::from([Motion::Land, Motion::Water])
    } else {
        BTreeSet::new()
    };
    Group {
        id: GroupId::new(),
        name: format!("{} {} warband", personality.id().to_lowercase(), race),
        units: units(&race, count, 1.0),
        race,
        owner: GroupOwner::Monster,
        home_structure: None,
        x: at.x,
        y: at.y,
        items,
        motion,
        activity: GroupActivity::Idle,
        personality: Some(personality),
        memory: AiMemory::default(),
    }
}
