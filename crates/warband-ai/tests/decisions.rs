//! Decision scenarios run against hand-built tick snapshots.

#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, TimeDelta, TimeZone, Utc};

use warband_ai::construction::{
    adopt_structure, demobilize, found_structure, found_structure_of_kind, upgrade_structure,
    validate_site,
};
use warband_ai::combat::{
    attack_monsters, attack_players, attack_structure, join_battle, merge_groups,
};
use warband_ai::inventory::consume_resources;
use warband_ai::movement::{advance_movement, execute_move};
use warband_ai::targeting::relocate_target;
use warband_ai::wander::{choose_heading, purposeful_wander};
use warband_ai::{
    ActionKind, AiConfig, DecisionContext, DeclineReason, FixedSequence, InterruptReason,
    Outcome, SeededRandom, Target, decide, evaluate_interrupt, select_target,
};
use warband_types::{
    AiMemory, Battle, BattleId, BattleSide, BattleSideState, BattleTargetKind, BuildStatus,
    BuildingState, Chunk, Direction, Group, GroupActivity, GroupId, GroupOwner, Inventory,
    ItemCode, MovementState, Motion, Mutation, Personality, PlayerId, ResourceDeposit,
    ResourceHotspot, ScannedStructure, Structure, StructureFeature, StructureId, StructureKind,
    StructureOwner, StructureSummary, TargetKind, TileCoord, TileData, Unit, UnitId, WorldScan,
};
use warband_world::{ChunkCache, Mobility, StaticTerrain, TerrainOracle};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()
}

fn make_units(count: usize) -> BTreeMap<UnitId, Unit> {
    (0..count)
        .map(|_| (UnitId::new(), Unit::new("grunt", 1.0)))
        .collect()
}

fn make_monster(race: &str, units: usize, at: TileCoord) -> Group {
    Group {
        id: GroupId::new(),
        name: format!("{race} band"),
        race: String::from(race),
        owner: GroupOwner::Monster,
        home_structure: None,
        x: at.x,
        y: at.y,
        units: make_units(units),
        items: Inventory::new(),
        motion: BTreeSet::new(),
        activity: GroupActivity::Idle,
        personality: Some(Personality::Balanced),
        memory: AiMemory::default(),
    }
}

fn make_player(units: usize, at: TileCoord) -> Group {
    Group {
        owner: GroupOwner::Player {
            player_id: PlayerId::new(),
        },
        personality: None,
        ..make_monster("human", units, at)
    }
}

fn make_structure(kind: StructureKind, at: TileCoord, owner: StructureOwner) -> Structure {
    Structure {
        id: StructureId::new(),
        kind,
        name: String::from("Hollow"),
        x: at.x,
        y: at.y,
        owner,
        owner_name: String::from("someone"),
        monster: matches!(owner, StructureOwner::Monster { .. }),
        level: 1,
        status: BuildStatus::Complete,
        capacity: 10,
        items: Inventory::new(),
        features: BTreeSet::new(),
        buildings: BTreeMap::new(),
        builder: None,
        battle_id: None,
        health: 200,
        max_health: 200,
        monster_friendly: false,
        last_activity: None,
        last_upgraded: None,
    }
}

fn scanned(kind: StructureKind, at: TileCoord, monster: bool) -> ScannedStructure {
    ScannedStructure {
        x: at.x,
        y: at.y,
        structure: StructureSummary {
            id: StructureId::new(),
            kind,
            level: 1,
            defense_power: Some(1.0),
            health: 100,
            max_health: 100,
            owner: String::from("someone"),
            monster,
        },
    }
}

fn rich_inventory() -> Inventory {
    let mut items = Inventory::new();
    for code in ["WOODEN_STICKS", "STONE", "BONE", "HIDE", "IRON_ORE", "CRYSTAL"] {
        items.add(ItemCode::new(code), 100);
    }
    items
}

/// Mutable world snapshot; [`Fixture::cache`] freezes it for a tick.
struct Fixture {
    chunks: BTreeMap<String, Chunk>,
    scan: WorldScan,
    terrain: StaticTerrain,
    config: AiConfig,
    now: DateTime<Utc>,
}

impl Fixture {
    fn new() -> Self {
        Self {
            chunks: BTreeMap::new(),
            scan: WorldScan::default(),
            terrain: StaticTerrain::all_land(),
            config: AiConfig::default(),
            now: now(),
        }
    }

    fn tile_mut(&mut self, at: TileCoord) -> &mut TileData {
        self.chunks
            .entry(at.chunk_key())
            .or_default()
            .entry(at.tile_key())
            .or_default()
    }

    fn place(&mut self, group: &Group) {
        self.tile_mut(group.coord())
            .groups
            .insert(group.id, group.clone());
    }

    fn build(&mut self, structure: &Structure) {
        self.tile_mut(structure.coord()).structure = Some(structure.clone());
    }

    fn cache(&self) -> ChunkCache {
        let mut cache = ChunkCache::new();
        for (key, chunk) in &self.chunks {
            cache.insert(key.clone(), chunk.clone());
        }
        cache
    }

    fn ctx<'a>(&'a self, cache: &'a ChunkCache) -> DecisionContext<'a> {
        DecisionContext {
            chunks: cache,
            scan: &self.scan,
            terrain: &self.terrain,
            config: &self.config,
            now: self.now,
        }
    }
}

fn put_groups(outcome: &Outcome) -> Vec<&Group> {
    outcome
        .mutations()
        .iter()
        .filter_map(|m| match m {
            Mutation::PutGroup(g) => Some(g.as_ref()),
            _ => None,
        })
        .collect()
}

fn put_structure(outcome: &Outcome) -> &Structure {
    outcome
        .mutations()
        .iter()
        .find_map(|m| match m {
            Mutation::PutStructure(s) => Some(s.as_ref()),
            _ => None,
        })
        .expect("structure write")
}

fn put_battle(outcome: &Outcome) -> &Battle {
    outcome
        .mutations()
        .iter()
        .find_map(|m| match m {
            Mutation::PutBattle(b) => Some(b.as_ref()),
            _ => None,
        })
        .expect("battle write")
}

// ---------------------------------------------------------------------------
// Combat
// ---------------------------------------------------------------------------

#[test]
fn merge_unions_units_of_idle_kin() {
    let here = TileCoord::new(3, 3);
    let leader = make_monster("goblin", 2, here);
    let a = make_monster("goblin", 1, here);
    let b = make_monster("goblin", 3, here);
    let rival = make_monster("orc", 5, here);

    let mut fx = Fixture::new();
    for g in [&leader, &a, &b, &rival] {
        fx.place(g);
    }
    let cache = fx.cache();
    let outcome = merge_groups(&leader, &fx.ctx(&cache));

    assert_eq!(outcome.kind(), Some(ActionKind::Merge));
    let writes = put_groups(&outcome);
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].units.len(), 6);

    let removed: BTreeSet<GroupId> = outcome
        .mutations()
        .iter()
        .filter_map(|m| match m {
            Mutation::RemoveGroup { group_id, .. } => Some(*group_id),
            _ => None,
        })
        .collect();
    assert_eq!(removed, BTreeSet::from([a.id, b.id]));

    let chats = outcome
        .mutations()
        .iter()
        .filter(|m| matches!(m, Mutation::Chat(_)))
        .count();
    assert_eq!(chats, 1);
}

#[test]
fn merge_ignores_busy_kin() {
    let here = TileCoord::new(0, 0);
    let leader = make_monster("goblin", 2, here);
    let mut gathering = make_monster("goblin", 2, here);
    gathering.activity = GroupActivity::Gathering(warband_types::GatheringState {
        gathering_biome: String::from("forest"),
        gathering_started: now(),
    });

    let mut fx = Fixture::new();
    fx.place(&leader);
    fx.place(&gathering);
    let cache = fx.cache();
    let outcome = merge_groups(&leader, &fx.ctx(&cache));
    assert_eq!(outcome.reason(), Some(DeclineReason::NoSuitableTarget));
}

#[test]
fn attack_players_picks_three_smallest() {
    let here = TileCoord::new(-4, 7);
    let attacker = make_monster("troll", 8, here);
    let players: Vec<Group> = [5, 1, 3, 2]
        .into_iter()
        .map(|n| make_player(n, here))
        .collect();

    let mut fx = Fixture::new();
    fx.place(&attacker);
    for p in &players {
        fx.place(p);
    }
    let cache = fx.cache();
    let outcome = attack_players(&attacker, &fx.ctx(&cache));

    assert_eq!(outcome.kind(), Some(ActionKind::AttackPlayers));
    let battle = put_battle(&outcome);
    assert_eq!(battle.target_type, BattleTargetKind::Group);
    let mut defender_sizes: Vec<usize> =
        battle.side2.groups.values().map(|p| p.units.len()).collect();
    defender_sizes.sort_unstable();
    assert_eq!(defender_sizes, vec![1, 2, 3]);
    assert!(battle.side1.groups.contains_key(&attacker.id));

    let fighting: Vec<&Group> = put_groups(&outcome)
        .into_iter()
        .filter(|g| g.battle_link().is_some_and(|l| l.battle_id == battle.id))
        .collect();
    assert_eq!(fighting.len(), 4);
}

#[test]
fn join_battle_as_reinforcement() {
    let here = TileCoord::new(1, 1);
    let joiner = make_monster("goblin", 3, here);
    let battle = Battle {
        id: BattleId::new(),
        x: here.x,
        y: here.y,
        target_type: BattleTargetKind::Group,
        tick_count: 2,
        created_at: now(),
        side1: BattleSideState::default(),
        side2: BattleSideState::default(),
    };

    let mut fx = Fixture::new();
    fx.place(&joiner);
    fx.tile_mut(here).battles.insert(battle.id, battle.clone());
    let cache = fx.cache();

    // 0.1 is below the 0.3 attacker chance.
    let outcome = join_battle(&joiner, &fx.ctx(&cache), &mut FixedSequence::constant(0.1));
    assert_eq!(outcome.kind(), Some(ActionKind::JoinBattle));
    let written = put_battle(&outcome);
    assert!(written.side1.groups.contains_key(&joiner.id));
    let link = *put_groups(&outcome)[0].battle_link().unwrap();
    assert_eq!(link.battle_side, BattleSide::One);
    assert_eq!(link.battle_role, warband_types::BattleRole::Reinforcement);
}

#[test]
fn attack_monsters_picks_two_rivals_at_random() {
    let here = TileCoord::new(5, 5);
    let mut attacker = make_monster("orc", 6, here);
    attacker.personality = Some(Personality::Feral);
    let kin = make_monster("orc", 2, here);
    let rivals: Vec<Group> = (0..3).map(|_| make_monster("goblin", 2, here)).collect();

    let mut fx = Fixture::new();
    fx.place(&attacker);
    fx.place(&kin);
    for r in &rivals {
        fx.place(r);
    }
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    // Tile groups iterate in id order, so the shuffle is predictable.
    let mut ids: Vec<GroupId> = rivals.iter().map(|g| g.id).collect();
    ids.sort();

    let defenders = |value: f64| {
        let outcome = attack_monsters(&attacker, &ctx, &mut FixedSequence::constant(value));
        assert_eq!(outcome.kind(), Some(ActionKind::AttackMonsters));
        let battle = put_battle(&outcome);
        assert_eq!(battle.target_type, BattleTargetKind::MonsterGroup);
        assert!(battle.side1.groups.contains_key(&attacker.id));
        assert!(!battle.side2.groups.contains_key(&kin.id));
        assert_eq!(put_groups(&outcome).len(), 3);
        battle.side2.groups.keys().copied().collect::<BTreeSet<GroupId>>()
    };

    assert_eq!(defenders(0.0), BTreeSet::from([ids[1], ids[2]]));
    assert_eq!(defenders(0.99), BTreeSet::from([ids[0], ids[1]]));
}

#[test]
fn attack_monsters_needs_a_rival_race() {
    let here = TileCoord::new(0, 0);
    let attacker = make_monster("orc", 6, here);
    let kin = make_monster("orc", 2, here);

    let mut fx = Fixture::new();
    fx.place(&attacker);
    fx.place(&kin);
    let cache = fx.cache();
    let outcome = attack_monsters(&attacker, &fx.ctx(&cache), &mut FixedSequence::constant(0.0));
    assert_eq!(outcome.reason(), Some(DeclineReason::NoSuitableTarget));
}

#[test]
fn attack_structure_defends_with_the_structure() {
    let here = TileCoord::new(-2, 6);
    let attacker = make_monster("troll", 8, here);
    let outpost = make_structure(
        StructureKind::Outpost,
        here,
        StructureOwner::Player {
            player_id: PlayerId::new(),
        },
    );

    let mut fx = Fixture::new();
    fx.place(&attacker);
    fx.build(&outpost);
    let cache = fx.cache();
    let outcome = attack_structure(&attacker, &fx.ctx(&cache));

    assert_eq!(outcome.kind(), Some(ActionKind::AttackStructure));
    let battle = put_battle(&outcome);
    assert_eq!(battle.target_type, BattleTargetKind::Structure);
    assert!(battle.side2.groups.is_empty());
    let defence = battle.side2.structure.as_ref().unwrap();
    assert_eq!(defence.structure_id, outpost.id);
    assert!((defence.power - 30.0).abs() < 1e-9);
    assert_eq!(defence.owner, outpost.owner_name);

    let besieged = put_structure(&outcome);
    assert_eq!(besieged.id, outpost.id);
    assert_eq!(besieged.battle_id, Some(battle.id));

    let link = *put_groups(&outcome)[0].battle_link().unwrap();
    assert_eq!(link.battle_id, battle.id);
    assert_eq!(link.battle_side, BattleSide::One);
    assert_eq!(link.battle_role, warband_types::BattleRole::Attacker);
}

#[test]
fn attack_structure_skips_monster_and_besieged_structures() {
    let here = TileCoord::new(0, 0);
    let attacker = make_monster("troll", 8, here);
    let mut lair = make_structure(
        StructureKind::MonsterLair,
        here,
        StructureOwner::Monster {
            group_id: GroupId::new(),
        },
    );

    let mut fx = Fixture::new();
    fx.build(&lair);
    let cache = fx.cache();
    let outcome = attack_structure(&attacker, &fx.ctx(&cache));
    assert_eq!(outcome.reason(), Some(DeclineReason::NoSuitableTarget));

    lair.monster = false;
    lair.owner = StructureOwner::Player {
        player_id: PlayerId::new(),
    };
    lair.battle_id = Some(BattleId::new());
    fx.build(&lair);
    let cache = fx.cache();
    let outcome = attack_structure(&attacker, &fx.ctx(&cache));
    assert_eq!(outcome.reason(), Some(DeclineReason::NoSuitableTarget));
}

// ---------------------------------------------------------------------------
// Construction
// ---------------------------------------------------------------------------

#[test]
fn founding_requires_three_units() {
    let mut group = make_monster("goblin", 2, TileCoord::new(0, 0));
    group.items = rich_inventory();
    let fx = Fixture::new();
    let cache = fx.cache();
    let outcome = found_structure(&group, &fx.ctx(&cache), &mut FixedSequence::constant(0.0));
    assert_eq!(outcome.reason(), Some(DeclineReason::NotEnoughUnits));
}

#[test]
fn founding_respects_density_cap() {
    let here = TileCoord::new(50, 50);
    let mut group = make_monster("goblin", 5, here);
    group.personality = Some(Personality::Territorial);
    group.items = rich_inventory();

    let mut fx = Fixture::new();
    for offset in [(3, 0), (0, 4), (-5, -2)] {
        fx.scan.monster_structures.push(scanned(
            StructureKind::MonsterLair,
            here.offset(offset.0, offset.1),
            true,
        ));
    }
    let cache = fx.cache();
    let outcome = found_structure(&group, &fx.ctx(&cache), &mut FixedSequence::constant(0.0));
    assert_eq!(outcome.reason(), Some(DeclineReason::UnsuitableLocation));
}

#[test]
fn founding_writes_building_structure_and_pays() {
    let here = TileCoord::new(20, -20);
    let mut group = make_monster("goblin", 4, here);
    group.personality = Some(Personality::Territorial);
    group.items = rich_inventory();
    let before = group.items.total();

    let fx = Fixture::new();
    let cache = fx.cache();
    let outcome = found_structure(&group, &fx.ctx(&cache), &mut FixedSequence::constant(0.0));

    assert_eq!(outcome.kind(), Some(ActionKind::FoundStructure));
    let structure = put_structure(&outcome);
    assert_eq!(structure.coord(), here);
    assert!(structure.monster);
    assert_eq!(structure.status, BuildStatus::Building { build_progress: 0 });
    assert_eq!(structure.owner, StructureOwner::Monster { group_id: group.id });

    let builder = put_groups(&outcome)[0];
    assert!(matches!(
        &builder.activity,
        GroupActivity::Building(BuildingState { structure_id, .. }) if *structure_id == structure.id
    ));
    assert_eq!(builder.memory.preferred_structure_id, Some(structure.id));
    assert!(builder.items.total() < before);
}

#[test]
fn founding_rejects_player_kinds_and_unaffordable_payment() {
    let here = TileCoord::new(0, 0);
    let group = make_monster("goblin", 4, here);
    let fx = Fixture::new();
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let outcome = found_structure_of_kind(&group, StructureKind::Fortress, here, &ctx);
    assert_eq!(outcome.reason(), Some(DeclineReason::InvalidStructureType));

    let outcome = found_structure_of_kind(&group, StructureKind::MonsterLair, here, &ctx);
    assert_eq!(outcome.reason(), Some(DeclineReason::ResourceConsumptionFailed));

    let outcome = found_structure(&group, &ctx, &mut FixedSequence::constant(0.0));
    assert_eq!(outcome.reason(), Some(DeclineReason::InsufficientResources));
}

#[test]
fn upgrade_pays_from_store_and_unlocks_feature() {
    let here = TileCoord::new(2, 2);
    let group = make_monster("goblin", 3, here);
    let mut lair = make_structure(
        StructureKind::MonsterLair,
        here,
        StructureOwner::Monster { group_id: group.id },
    );
    lair.level = 0;
    lair.items = rich_inventory();

    let fx = Fixture::new();
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);
    let outcome = upgrade_structure(&group, &lair, &ctx);

    let upgraded = put_structure(&outcome);
    assert_eq!(upgraded.level, 2);
    assert!(upgraded.features.contains(&StructureFeature::Palisade));
    assert_eq!(upgraded.items.quantity(&ItemCode::new("WOODEN_STICKS")), 95);
    assert_eq!(upgraded.items.quantity(&ItemCode::new("STONE")), 97);

    lair.level = 5;
    let outcome = upgrade_structure(&group, &lair, &ctx);
    assert_eq!(outcome.reason(), Some(DeclineReason::MaxLevelReached));

    let fort = make_structure(
        StructureKind::Fortress,
        here,
        StructureOwner::Player {
            player_id: PlayerId::new(),
        },
    );
    let outcome = upgrade_structure(&group, &fort, &ctx);
    assert_eq!(outcome.reason(), Some(DeclineReason::NotMonsterStructure));
}

#[test]
fn demobilize_moves_every_item() {
    let here = TileCoord::new(0, 0);
    let mut group = make_monster("goblin", 3, here);
    let mut lair = make_structure(
        StructureKind::MonsterLair,
        here,
        StructureOwner::Monster { group_id: group.id },
    );
    lair.items.add(ItemCode::new("bone"), 2);

    let fx = Fixture::new();
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);
    assert_eq!(
        demobilize(&group, &lair, &ctx).reason(),
        Some(DeclineReason::NoItemsToDeposit)
    );

    group.items = serde_json::from_str(r#"[{"code": "Bone", "quantity": 3}]"#).unwrap();
    let outcome = demobilize(&group, &lair, &ctx);
    assert_eq!(outcome.kind(), Some(ActionKind::Demobilise));
    assert_eq!(put_structure(&outcome).items.quantity(&ItemCode::new("BONE")), 5);
    let depositor = put_groups(&outcome)[0];
    assert!(depositor.items.is_empty());
    assert!(matches!(depositor.activity, GroupActivity::Demobilising(_)));
}

#[test]
fn adoption_rules() {
    let here = TileCoord::new(9, 9);
    let group = make_monster("goblin", 3, here);
    let fx = Fixture::new();
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let mut site = make_structure(
        StructureKind::Outpost,
        here,
        StructureOwner::Player {
            player_id: PlayerId::new(),
        },
    );
    site.status = BuildStatus::Building { build_progress: 40 };
    site.last_activity = Some(now() - TimeDelta::hours(1));

    let outcome = adopt_structure(&group, &site, &ctx, &mut FixedSequence::constant(0.0));
    assert_eq!(outcome.reason(), Some(DeclineReason::NotMonsterFriendly));

    site.monster_friendly = true;
    let outcome = adopt_structure(&group, &site, &ctx, &mut FixedSequence::constant(0.5));
    assert_eq!(outcome.reason(), Some(DeclineReason::RandomRejection));

    let outcome = adopt_structure(&group, &site, &ctx, &mut FixedSequence::constant(0.1));
    assert_eq!(outcome.kind(), Some(ActionKind::Adopt));
    let adopted = put_structure(&outcome);
    assert!(adopted.monster);
    assert_eq!(adopted.builder, Some(group.id));

    site.status = BuildStatus::Complete;
    let outcome = adopt_structure(&group, &site, &ctx, &mut FixedSequence::constant(0.0));
    assert_eq!(outcome.reason(), Some(DeclineReason::StructureNotBuilding));
}

#[test]
fn adoption_blocked_by_active_builder() {
    let here = TileCoord::new(9, 9);
    let group = make_monster("goblin", 3, here);
    let mut site = make_structure(
        StructureKind::MonsterLair,
        here,
        StructureOwner::Monster {
            group_id: GroupId::new(),
        },
    );
    site.status = BuildStatus::Building { build_progress: 10 };

    let mut builder = make_monster("goblin", 3, here);
    builder.activity = GroupActivity::Building(BuildingState {
        structure_id: site.id,
        site: here,
        building_started: now(),
    });

    let mut fx = Fixture::new();
    fx.place(&group);
    fx.place(&builder);
    fx.build(&site);
    let cache = fx.cache();
    let outcome = adopt_structure(&group, &site, &fx.ctx(&cache), &mut FixedSequence::constant(0.0));
    assert_eq!(outcome.reason(), Some(DeclineReason::HasActiveBuilder));
}

#[test]
fn upgrade_stops_at_configured_max_level() {
    let here = TileCoord::new(4, 4);
    let group = make_monster("goblin", 3, here);
    let mut lair = make_structure(
        StructureKind::MonsterLair,
        here,
        StructureOwner::Monster { group_id: group.id },
    );
    lair.items = rich_inventory();

    let mut fx = Fixture::new();
    fx.config.max_structure_level = 3;
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    lair.level = 3;
    let outcome = upgrade_structure(&group, &lair, &ctx);
    assert_eq!(outcome.reason(), Some(DeclineReason::MaxLevelReached));
    assert!(outcome.mutations().is_empty());

    lair.level = 2;
    let outcome = upgrade_structure(&group, &lair, &ctx);
    assert_eq!(put_structure(&outcome).level, 3);
}

#[test]
fn site_claimed_by_a_remote_builder_is_rejected() {
    let here = TileCoord::new(0, 0);
    let site = TileCoord::new(2, 1);
    let group = make_monster("goblin", 4, here);

    // The builder stands on its own tile while its recorded site is jittered.
    let mut builder = make_monster("goblin", 4, TileCoord::new(1, 1));
    builder.activity = GroupActivity::Building(BuildingState {
        structure_id: StructureId::new(),
        site,
        building_started: now(),
    });

    let mut fx = Fixture::new();
    fx.place(&group);
    fx.place(&builder);
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    assert!(!validate_site(&group, site, &ctx));
    assert!(validate_site(&group, TileCoord::new(-2, 1), &ctx));
}

#[test]
fn consumption_is_all_or_nothing_for_both_formats() {
    let required: BTreeMap<ItemCode, u32> =
        BTreeMap::from([(ItemCode::new("WOOD"), 3), (ItemCode::new("STONE"), 2)]);

    for raw in [
        r#"{"wood": 5, "stone": 1}"#,
        r#"[{"code": "wood", "quantity": 5}, {"code": "stone", "quantity": 1}]"#,
    ] {
        let mut inv: Inventory = serde_json::from_str(raw).unwrap();
        let snapshot = inv.clone();
        assert!(consume_resources(&mut inv, &required).is_err());
        assert_eq!(inv, snapshot);

        inv.add(ItemCode::new("stone"), 1);
        consume_resources(&mut inv, &required).unwrap();
        assert_eq!(inv.quantity(&ItemCode::new("WOOD")), 2);
        assert_eq!(inv.quantity(&ItemCode::new("STONE")), 0);
    }
}

// ---------------------------------------------------------------------------
// Targeting and movement
// ---------------------------------------------------------------------------

fn busy_scan(origin: TileCoord) -> WorldScan {
    WorldScan {
        monster_structures: vec![scanned(StructureKind::MonsterLair, origin.offset(6, 2), true)],
        player_spawns: vec![scanned(StructureKind::Spawn, origin.offset(-12, 9), false)],
        player_structures: vec![scanned(StructureKind::Outpost, origin.offset(4, -15), false)],
        resource_hotspots: vec![ResourceHotspot {
            x: origin.x.saturating_add(8),
            y: origin.y.saturating_sub(3),
            resource: ItemCode::new("IRON_ORE"),
            amount: 12,
        }],
        monster_groups: Vec::new(),
    }
}

#[test]
fn seeded_selection_is_repeatable() {
    let here = TileCoord::new(0, 0);
    let group = make_monster("goblin", 6, here);
    let mut fx = Fixture::new();
    fx.scan = busy_scan(here);
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    for seed in 0..16 {
        let first = select_target(&group, &ctx, &mut SeededRandom::new(seed));
        let second = select_target(&group, &ctx, &mut SeededRandom::new(seed));
        assert_eq!(first, second);
    }
}

#[test]
fn selection_never_exceeds_category_distance() {
    let here = TileCoord::new(0, 0);
    let group = make_monster("goblin", 6, here);
    let mut fx = Fixture::new();
    fx.scan.resource_hotspots.push(ResourceHotspot {
        x: 90,
        y: 0,
        resource: ItemCode::new("STONE"),
        amount: 40,
    });
    fx.scan
        .player_spawns
        .push(scanned(StructureKind::Spawn, TileCoord::new(0, 75), false));
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    for seed in 0..32 {
        assert_eq!(select_target(&group, &ctx, &mut SeededRandom::new(seed)), None);
    }
}

#[test]
fn water_only_target_relocates_or_drops() {
    let origin = TileCoord::new(0, 0);
    let target = TileCoord::new(10, 0);
    let pond = TileCoord::new(12, 1);

    let mut fx = Fixture::new();
    fx.terrain = StaticTerrain::all_land().with_water([pond]);
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);
    assert_eq!(
        relocate_target(origin, target, Mobility::WATER_ONLY, &ctx, 5, 40.0),
        Some(pond)
    );

    fx.terrain = StaticTerrain::all_land();
    let ctx = fx.ctx(&cache);
    assert_eq!(
        relocate_target(origin, target, Mobility::WATER_ONLY, &ctx, 5, 40.0),
        None
    );
}

#[test]
fn exploring_group_heads_for_one_of_three_closest_spawns() {
    let here = TileCoord::new(0, 0);
    let source = scanned(StructureKind::MonsterLair, TileCoord::new(0, -5), true);
    let mut group = make_monster("goblin", 6, here);
    group.memory.exploration_ticks = 4;
    group.memory.mobilized_from_structure = Some(source.structure.id);

    let mut fx = Fixture::new();
    fx.scan.monster_structures.push(source);
    for x in [20, 5, 15, 10, 60] {
        fx.scan
            .player_spawns
            .push(scanned(StructureKind::Spawn, TileCoord::new(x, 0), false));
    }
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    for (value, expected_x) in [(0.0, 5), (0.5, 10), (0.99, 15)] {
        let target = select_target(&group, &ctx, &mut FixedSequence::constant(value)).unwrap();
        assert_eq!(target.kind, TargetKind::PlayerSpawn);
        assert_eq!(target.coord, TileCoord::new(expected_x, 0));
        assert!(!target.hop);
        let spawn = ctx.scan.find_structure(target.structure_id.unwrap()).unwrap();
        assert_eq!(spawn.coord(), target.coord);
    }

    // Without a known source the redirect does not apply.
    group.memory.mobilized_from_structure = Some(StructureId::new());
    let target = select_target(&group, &ctx, &mut FixedSequence::constant(0.99)).unwrap();
    assert_ne!(target.coord, TileCoord::new(15, 0));
}

#[test]
fn exploring_favours_spawns_over_monster_structures() {
    let here = TileCoord::new(0, 0);
    let mut group = make_monster("goblin", 6, here);

    let mut fx = Fixture::new();
    fx.scan
        .monster_structures
        .push(scanned(StructureKind::MonsterLair, TileCoord::new(10, 0), true));
    fx.scan
        .player_spawns
        .push(scanned(StructureKind::Spawn, TileCoord::new(0, 10), false));
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    // Settled weights are 0.67 and 0.6; exploring makes them 0.067 and 2.4.
    let settled = select_target(&group, &ctx, &mut FixedSequence::constant(0.5)).unwrap();
    assert_eq!(settled.kind, TargetKind::MonsterStructure);

    group.memory.exploration_ticks = 3;
    let exploring = select_target(&group, &ctx, &mut FixedSequence::constant(0.5)).unwrap();
    assert_eq!(exploring.kind, TargetKind::PlayerSpawn);
    assert_eq!(exploring.coord, TileCoord::new(0, 10));

    let exploring = select_target(&group, &ctx, &mut FixedSequence::constant(0.02)).unwrap();
    assert_eq!(exploring.kind, TargetKind::MonsterStructure);
}

#[test]
fn adjacent_player_group_becomes_a_hop() {
    let here = TileCoord::new(3, 3);
    let mut group = make_monster("goblin", 5, here);
    group.personality = Some(Personality::Aggressive);
    let player = make_player(2, here.offset(1, 0));

    let mut fx = Fixture::new();
    fx.place(&group);
    fx.place(&player);
    fx.scan = busy_scan(here);
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let target = select_target(&group, &ctx, &mut FixedSequence::constant(0.0)).unwrap();
    assert!(target.hop);
    assert_eq!(target.kind, TargetKind::AdjacentGroup);
    assert_eq!(target.coord, player.coord());
    assert!((target.max_distance - fx.config.hop_distance).abs() < 1e-9);

    let outcome = execute_move(&group, &target, &ctx, &mut FixedSequence::constant(0.0));
    assert_eq!(outcome.kind(), Some(ActionKind::Hop));
    let state = put_groups(&outcome)[0].movement().unwrap();
    assert_eq!(state.path, vec![here, player.coord()]);
    assert_eq!(state.target_kind, TargetKind::AdjacentGroup);

    // 0.95 fails the 0.9 opportunism roll.
    let target = select_target(&group, &ctx, &mut FixedSequence::constant(0.95)).unwrap();
    assert!(!target.hop);
}

#[test]
fn strong_spawns_are_filtered_unless_a_weak_bold_group_gambles() {
    let here = TileCoord::new(0, 0);
    let mut fortified = scanned(StructureKind::Spawn, TileCoord::new(0, 10), false);
    fortified.structure.defense_power = Some(100.0);

    let mut fx = Fixture::new();
    fx.scan.player_spawns.push(fortified);
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let steady = make_monster("goblin", 6, here);
    assert_eq!(select_target(&steady, &ctx, &mut FixedSequence::constant(0.9)), None);

    let mut timid = make_monster("goblin", 2, here);
    assert_eq!(select_target(&timid, &ctx, &mut FixedSequence::constant(0.1)), None);

    // Rolls go to opportunism, then the 0.3 bypass, then the draw.
    timid.personality = Some(Personality::Aggressive);
    let target = select_target(&timid, &ctx, &mut FixedSequence::constant(0.1)).unwrap();
    assert_eq!(target.kind, TargetKind::PlayerSpawn);
    assert_eq!(target.coord, TileCoord::new(0, 10));

    assert_eq!(select_target(&timid, &ctx, &mut FixedSequence::constant(0.5)), None);
}

#[test]
fn move_order_sets_only_movement_fields() {
    let here = TileCoord::new(0, 0);
    let group = make_monster("goblin", 4, here);
    let fx = Fixture::new();
    let cache = fx.cache();
    let target = Target {
        coord: TileCoord::new(9, 0),
        kind: TargetKind::ResourceHotspot,
        structure_id: None,
        hop: false,
        max_distance: 25.0,
    };
    let outcome = execute_move(&group, &target, &fx.ctx(&cache), &mut FixedSequence::constant(0.99));

    assert_eq!(outcome.kind(), Some(ActionKind::Move));
    let moved = put_groups(&outcome)[0];
    let state = moved.movement().unwrap();
    assert_eq!(state.path.first(), Some(&here));
    assert_eq!(state.path.len(), 4);
    assert_eq!(state.target(), target.coord);

    let json = serde_json::to_value(moved).unwrap();
    let activity = &json["activity"];
    assert_eq!(activity["status"], "moving");
    assert!(activity.get("battle_id").is_none());
    assert!(activity.get("gathering_biome").is_none());
    assert!(activity.get("demobilise_start").is_none());
}

#[test]
fn island_group_cannot_move() {
    let here = TileCoord::new(0, 0);
    let group = make_monster("goblin", 4, here);
    let mut fx = Fixture::new();
    fx.terrain = StaticTerrain::all_water().with_land([here]);
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let hop = Target {
        coord: TileCoord::new(1, 0),
        kind: TargetKind::AdjacentGroup,
        structure_id: None,
        hop: true,
        max_distance: 1.5,
    };
    let outcome = execute_move(&group, &hop, &ctx, &mut SeededRandom::new(1));
    assert_eq!(outcome.reason(), Some(DeclineReason::BlockedByTerrain));

    let outcome = purposeful_wander(&group, &ctx, &mut SeededRandom::new(1));
    assert_eq!(outcome.reason(), Some(DeclineReason::SurroundedByWater));
}

#[test]
fn swimmers_are_never_surrounded() {
    let here = TileCoord::new(0, 0);
    let mut group = make_monster("naga", 4, here);
    group.motion = BTreeSet::from([Motion::Water]);
    let mut fx = Fixture::new();
    fx.terrain = StaticTerrain::all_water();
    let cache = fx.cache();
    let outcome = purposeful_wander(&group, &fx.ctx(&cache), &mut SeededRandom::new(5));
    assert_eq!(outcome.kind(), Some(ActionKind::Wander));
}

fn moving_group(path: Vec<TileCoord>, started: DateTime<Utc>, next: DateTime<Utc>) -> Group {
    let mut group = make_monster("goblin", 3, path[0]);
    let end = *path.last().unwrap();
    group.activity = GroupActivity::Moving(MovementState {
        path,
        path_index: 0,
        move_started: started,
        move_speed: 1.0,
        target_x: end.x,
        target_y: end.y,
        target_kind: TargetKind::Wander,
        next_move_time: next,
    });
    group
}

#[test]
fn movement_advances_one_waypoint_at_a_time() {
    let path = vec![TileCoord::new(0, 0), TileCoord::new(1, 0), TileCoord::new(2, 0)];
    let group = moving_group(path, now(), now() - TimeDelta::seconds(1));
    let fx = Fixture::new();
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let outcome = advance_movement(&group, &ctx);
    assert_eq!(outcome.kind(), Some(ActionKind::Advance));
    assert!(outcome.mutations().iter().any(|m| matches!(
        m,
        Mutation::RemoveGroup { at, .. } if *at == TileCoord::new(0, 0)
    )));
    let mut stepped = put_groups(&outcome)[0].clone();
    assert_eq!(stepped.coord(), TileCoord::new(1, 0));
    assert_eq!(stepped.movement().unwrap().path_index, 1);

    assert_eq!(
        advance_movement(&stepped, &ctx).reason(),
        Some(DeclineReason::StillMoving)
    );

    if let GroupActivity::Moving(m) = &mut stepped.activity {
        m.next_move_time = now() - TimeDelta::seconds(1);
    }
    let outcome = advance_movement(&stepped, &ctx);
    assert_eq!(outcome.kind(), Some(ActionKind::Arrive));
    let arrived = put_groups(&outcome)[0];
    assert_eq!(arrived.coord(), TileCoord::new(2, 0));
    assert!(arrived.is_idle());
}

// ---------------------------------------------------------------------------
// Interrupts and dispatch
// ---------------------------------------------------------------------------

#[test]
fn interrupts_wait_for_grace_period() {
    let here = TileCoord::new(0, 0);
    let path = vec![here, TileCoord::new(1, 0)];
    let fresh = moving_group(path.clone(), now() - TimeDelta::seconds(10), now());
    let seasoned = moving_group(path, now() - TimeDelta::seconds(60), now());
    let battle = Battle {
        id: BattleId::new(),
        x: here.x,
        y: here.y,
        target_type: BattleTargetKind::Group,
        tick_count: 0,
        created_at: now(),
        side1: BattleSideState::default(),
        side2: BattleSideState::default(),
    };

    let mut fx = Fixture::new();
    fx.tile_mut(here).battles.insert(battle.id, battle.clone());
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let mut rng = FixedSequence::constant(0.99);
    assert_eq!(evaluate_interrupt(&fresh, &ctx, &mut rng), None);

    let decision = evaluate_interrupt(&seasoned, &ctx, &mut rng).unwrap();
    assert_eq!(decision.reason, InterruptReason::JoinBattle);
    assert_eq!(decision.battle_id, Some(battle.id));

    let outcome = decide(&seasoned, &ctx, &mut FixedSequence::constant(0.99));
    assert_eq!(outcome.kind(), Some(ActionKind::JoinBattle));
    let link = *put_groups(&outcome)[0].battle_link().unwrap();
    assert_eq!(link.battle_side, BattleSide::Two);
}

#[test]
fn dispatch_skips_players_and_busy_groups() {
    let here = TileCoord::new(0, 0);
    let fx = Fixture::new();
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);
    let mut rng = SeededRandom::new(9);

    let player = make_player(3, here);
    assert_eq!(decide(&player, &ctx, &mut rng).reason(), Some(DeclineReason::NoAction));

    let mut gatherer = make_monster("goblin", 3, here);
    gatherer.activity = GroupActivity::Gathering(warband_types::GatheringState {
        gathering_biome: String::from("hills"),
        gathering_started: now(),
    });
    assert_eq!(decide(&gatherer, &ctx, &mut rng).reason(), Some(DeclineReason::Busy));
}

#[test]
fn idle_group_always_reaches_a_decision() {
    let here = TileCoord::new(0, 0);
    let group = make_monster("goblin", 5, here);
    let mut fx = Fixture::new();
    fx.scan = busy_scan(here);
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    for seed in 0..24 {
        let outcome = decide(&group, &ctx, &mut SeededRandom::new(seed));
        assert!(outcome.is_acted(), "seed {seed}: {outcome:?}");
    }
}

fn seasoned_mover(at: TileCoord) -> Group {
    moving_group(
        vec![at, at.offset(1, 0), at.offset(2, 0)],
        now() - TimeDelta::seconds(60),
        now() + TimeDelta::seconds(5),
    )
}

#[test]
fn interrupt_attacks_weaker_players() {
    let here = TileCoord::new(0, 0);
    let group = seasoned_mover(here);
    let mut fx = Fixture::new();
    fx.place(&make_player(1, here));
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let decision = evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.99)).unwrap();
    assert_eq!(decision.reason, InterruptReason::AttackPlayers);
    assert!(decision.is_immediate());

    // Every gate roll below the 0.5 threshold skips its check.
    assert_eq!(evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.1)), None);
}

#[test]
fn interrupt_besieges_a_beatable_structure() {
    let here = TileCoord::new(0, 0);
    let outpost = make_structure(
        StructureKind::Outpost,
        here,
        StructureOwner::Player {
            player_id: PlayerId::new(),
        },
    );
    let mut fx = Fixture::new();
    fx.build(&outpost);
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    // Three grunts against a 30-power outpost is not worth it.
    let mut group = seasoned_mover(here);
    assert_eq!(evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.99)), None);

    group.units = make_units(40);
    let decision = evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.99)).unwrap();
    assert_eq!(decision.reason, InterruptReason::AttackStructure);
    assert_eq!(decision.structure_id, Some(outpost.id));

    let outcome = decide(&group, &ctx, &mut FixedSequence::constant(0.99));
    assert_eq!(outcome.kind(), Some(ActionKind::AttackStructure));
}

#[test]
fn only_feral_groups_interrupt_for_rival_monsters() {
    let here = TileCoord::new(0, 0);
    let mut fx = Fixture::new();
    fx.place(&make_monster("orc", 2, here));
    fx.place(&make_monster("goblin", 2, here));
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let mut group = seasoned_mover(here);
    assert_eq!(evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.99)), None);

    group.personality = Some(Personality::Feral);
    let decision = evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.99)).unwrap();
    assert_eq!(decision.reason, InterruptReason::AttackMonsters);
}

#[test]
fn resource_poor_group_stops_to_gather() {
    let here = TileCoord::new(0, 0);
    let mut fx = Fixture::new();
    fx.tile_mut(here).resources.push(ResourceDeposit {
        code: ItemCode::new("STONE"),
        amount: 8,
    });
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let mut group = seasoned_mover(here);
    let decision = evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.99)).unwrap();
    assert_eq!(decision.reason, InterruptReason::Gather);

    group.items = rich_inventory();
    assert_eq!(evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.99)), None);
}

#[test]
fn pursuit_prefers_the_highest_priority_target_in_range() {
    let here = TileCoord::new(0, 0);
    let mut fx = Fixture::new();
    fx.scan.resource_hotspots.push(ResourceHotspot {
        x: 3,
        y: 0,
        resource: ItemCode::new("STONE"),
        amount: 10,
    });
    fx.scan
        .player_spawns
        .push(scanned(StructureKind::Spawn, TileCoord::new(0, 6), false));
    fx.scan
        .player_spawns
        .push(scanned(StructureKind::Spawn, TileCoord::new(0, -12), false));
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    let mut group = seasoned_mover(here);
    let decision = evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.99)).unwrap();
    assert_eq!(decision.reason, InterruptReason::PursueTarget);
    assert!(!decision.is_immediate());
    let target = decision.target.unwrap();
    assert_eq!(target.kind, TargetKind::PlayerSpawn);
    assert_eq!(target.coord, TileCoord::new(0, 6));

    // Already heading for a spawn: nothing in range ranks higher.
    if let GroupActivity::Moving(m) = &mut group.activity {
        m.target_kind = TargetKind::PlayerSpawn;
    }
    assert_eq!(evaluate_interrupt(&group, &ctx, &mut FixedSequence::constant(0.99)), None);
}

#[test]
fn wander_heading_follows_personality() {
    let origin = TileCoord::new(0, 0);
    let lair = scanned(StructureKind::MonsterLair, origin, true);
    let mut fx = Fixture::new();
    fx.scan.monster_structures.push(lair.clone());
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    // Nomads keep their heading on rolls below 0.7.
    let mut nomad = make_monster("goblin", 3, TileCoord::new(4, 4));
    nomad.personality = Some(Personality::Nomadic);
    nomad.memory.preferred_direction = Some(Direction::East);
    assert_eq!(choose_heading(&nomad, &ctx, &mut FixedSequence::constant(0.5)), Direction::East);
    assert_eq!(
        choose_heading(&nomad, &ctx, &mut FixedSequence::constant(0.9)),
        Direction::NorthWest
    );

    // Territorial groups circle their origin and turn back beyond the radius.
    let mut keeper = make_monster("goblin", 3, TileCoord::new(3, 0));
    keeper.personality = Some(Personality::Territorial);
    keeper.memory.mobilized_from_structure = Some(lair.structure.id);
    let mut rng = FixedSequence::constant(0.0);
    assert_eq!(choose_heading(&keeper, &ctx, &mut rng), Direction::South);
    keeper.x = 10;
    assert_eq!(choose_heading(&keeper, &ctx, &mut rng), Direction::West);

    // Aggressive groups march on the world centre.
    let mut raider = make_monster("goblin", 3, TileCoord::new(0, 9));
    raider.personality = Some(Personality::Aggressive);
    assert_eq!(choose_heading(&raider, &ctx, &mut rng), Direction::North);
    raider.x = -7;
    raider.y = 0;
    assert_eq!(choose_heading(&raider, &ctx, &mut rng), Direction::East);

    // Feral groups take a fresh heading on rolls below 0.6.
    let mut feral = make_monster("goblin", 3, TileCoord::new(4, 4));
    feral.personality = Some(Personality::Feral);
    feral.memory.preferred_direction = Some(Direction::South);
    assert_eq!(choose_heading(&feral, &ctx, &mut FixedSequence::constant(0.7)), Direction::South);
    assert_eq!(choose_heading(&feral, &ctx, &mut FixedSequence::constant(0.1)), Direction::North);
}

#[test]
fn water_only_group_wanders_when_targets_are_on_land() {
    let here = TileCoord::new(0, 0);
    let lake: Vec<TileCoord> = (-3..=3)
        .flat_map(|dy| (-3..=3).map(move |dx| here.offset(dx, dy)))
        .collect();
    let mut group = make_monster("naga", 4, here);
    group.motion = BTreeSet::from([Motion::Water]);

    let mut fx = Fixture::new();
    fx.terrain = StaticTerrain::all_land().with_water(lake);
    fx.place(&group);
    fx.scan.resource_hotspots.push(ResourceHotspot {
        x: 20,
        y: 0,
        resource: ItemCode::new("STONE"),
        amount: 30,
    });
    let cache = fx.cache();
    let ctx = fx.ctx(&cache);

    assert_eq!(select_target(&group, &ctx, &mut FixedSequence::constant(0.9)), None);

    let outcome = decide(&group, &ctx, &mut FixedSequence::constant(0.9));
    assert_eq!(outcome.kind(), Some(ActionKind::Wander));
    let state = put_groups(&outcome)[0].movement().unwrap();
    assert!(state.path.len() > 1);
    assert!(state.path.iter().all(|at| fx.terrain.is_water(*at)));
    assert_ne!(state.target(), TileCoord::new(20, 0));
}
