//! Construction manager.
//!
//! Founding, upgrading, inner buildings, demobilisation and adoption of
//! unfinished structures. Founding is paid from the group's own items;
//! upgrades and inner buildings are paid from the structure's store.
//! Payments go through [`consume_resources`], so a failed payment never
//! leaves a partial deduction behind.

use std::collections::{BTreeMap, BTreeSet};

use chrono::TimeDelta;
use tracing::debug;

use warband_types::{
    BuildStatus, BuildingId, BuildingKind, BuildingState, ChatMessage, DemobiliseState, Group,
    GroupActivity, InnerBuilding, Inventory, Mutation, Personality, Structure, StructureId,
    StructureKind, StructureOwner, TileCoord,
};
use warband_world::{
    blueprint, building_blueprint, building_upgrade_cost, feature_for_level,
    structure_upgrade_cost,
};

use crate::context::DecisionContext;
use crate::inventory::consume_resources;
use crate::outcome::{Action, ActionKind, DeclineReason, Outcome};
use crate::random::{RandomSource, pick};

/// Builders look for hotspots within this distance.
const BUILDER_HOTSPOT_RADIUS: f64 = 10.0;

/// Aggressive groups found structures in this distance band around the
/// nearest player spawn.
const AGGRESSIVE_RING: (f64, f64) = (5.0, 15.0);

/// Jitter applied to the default build site.
const SITE_JITTER: i32 = 2;

// ---------------------------------------------------------------------------
// Founding
// ---------------------------------------------------------------------------

/// Try to found a new structure near `group`.
pub fn found_structure(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    if group.unit_count() < ctx.config.min_units_for_building {
        return Outcome::Declined(DeclineReason::NotEnoughUnits);
    }

    let here = group.coord();
    let preferred = preferred_site(group, ctx, rng);
    let Some(site) = [preferred, here]
        .into_iter()
        .find(|site| validate_site(group, *site, ctx))
    else {
        debug!(group_id = %group.id, x = here.x, y = here.y, "No valid build site");
        return Outcome::Declined(DeclineReason::UnsuitableLocation);
    };

    let Some(kind) = choose_structure_kind(group, rng) else {
        return Outcome::Declined(DeclineReason::InsufficientResources);
    };
    found_structure_of_kind(group, kind, site, ctx)
}

/// Found a structure of a specific kind at `site`.
pub fn found_structure_of_kind(
    group: &Group,
    kind: StructureKind,
    site: TileCoord,
    ctx: &DecisionContext<'_>,
) -> Outcome {
    if !kind.is_monster_kind() {
        return Outcome::Declined(DeclineReason::InvalidStructureType);
    }
    let bp = blueprint(kind);

    let mut builder = group.clone();
    if let Err(err) = consume_resources(&mut builder.items, &bp.build_cost) {
        debug!(group_id = %group.id, error = %err, "Build payment failed");
        return Outcome::Declined(DeclineReason::ResourceConsumptionFailed);
    }

    let id = StructureId::new();
    let structure = Structure {
        id,
        kind,
        name: format!("{} {}", group.name, bp.name),
        x: site.x,
        y: site.y,
        owner: StructureOwner::Monster { group_id: group.id },
        owner_name: group.name.clone(),
        monster: true,
        level: 1,
        status: BuildStatus::Building { build_progress: 0 },
        capacity: bp.capacity,
        items: Inventory::new(),
        features: BTreeSet::new(),
        buildings: BTreeMap::new(),
        builder: Some(group.id),
        battle_id: None,
        health: bp.durability,
        max_health: bp.durability,
        monster_friendly: false,
        last_activity: Some(ctx.now),
        last_upgraded: None,
    };

    builder.activity = GroupActivity::Building(BuildingState {
        structure_id: id,
        site,
        building_started: ctx.now,
    });
    builder.memory.preferred_structure_id = Some(id);
    builder.home_structure = Some(id);

    debug!(group_id = %group.id, structure_id = %id, kind = ?kind, x = site.x, y = site.y, "Structure founded");
    let text = format!("{} begins raising a {}", group.name, bp.name);
    Outcome::Acted(
        Action::new(ActionKind::FoundStructure)
            .toward(site, None)
            .on_structure(id)
            .with(Mutation::put_structure(structure))
            .with(Mutation::put_group(builder))
            .with(Mutation::Chat(ChatMessage::event(text, site, ctx.now))),
    )
}

/// Personality-driven build site. Validation happens separately.
#[allow(clippy::cast_possible_truncation)] // site offsets are bounded by the aggressive ring
fn preferred_site(group: &Group, ctx: &DecisionContext<'_>, rng: &mut dyn RandomSource) -> TileCoord {
    let here = group.coord();
    match group.personality() {
        Personality::Territorial => here,
        Personality::Builder => ctx
            .scan
            .resource_hotspots
            .iter()
            .map(warband_types::ResourceHotspot::coord)
            .filter(|at| here.distance(*at) <= BUILDER_HOTSPOT_RADIUS)
            .min_by(|a, b| here.distance(*a).total_cmp(&here.distance(*b)))
            .unwrap_or(here),
        Personality::Aggressive => {
            let Some(spawn) = ctx
                .scan
                .player_spawns
                .iter()
                .map(warband_types::ScannedStructure::coord)
                .min_by(|a, b| here.distance(*a).total_cmp(&here.distance(*b)))
            else {
                return here;
            };
            let d = spawn.distance(here);
            if d < f64::EPSILON {
                return here;
            }
            let band = d.clamp(AGGRESSIVE_RING.0, AGGRESSIVE_RING.1);
            let dx = (f64::from(here.x) - f64::from(spawn.x)) / d * band;
            let dy = (f64::from(here.y) - f64::from(spawn.y)) / d * band;
            spawn.offset(dx.round() as i32, dy.round() as i32)
        }
        _ => here.offset(
            rng.range_i32(-SITE_JITTER, SITE_JITTER),
            rng.range_i32(-SITE_JITTER, SITE_JITTER),
        ),
    }
}

/// Whether a structure may be founded at `site` by `group`.
pub fn validate_site(group: &Group, site: TileCoord, ctx: &DecisionContext<'_>) -> bool {
    let cfg = ctx.config;
    if ctx.terrain.is_water(site) {
        return false;
    }
    if ctx.chunks.structure_at(site).is_some() || scanned_structure_at(ctx, site) {
        return false;
    }
    if site_under_construction(ctx, site) {
        return false;
    }
    let crowded = |center| monster_structures_near(ctx, center) >= cfg.structure_density_cap;
    if crowded(site) || crowded(group.coord()) {
        return false;
    }
    !ctx
        .scan
        .player_spawns
        .iter()
        .any(|s| s.coord().distance(site) < cfg.min_spawn_distance)
}

/// Whether a cached group is building on `site` or stands there building.
/// Builders stay on their own tile, so the site is matched by the
/// recorded build site as well.
fn site_under_construction(ctx: &DecisionContext<'_>, site: TileCoord) -> bool {
    if ctx
        .chunks
        .tile(site)
        .is_some_and(warband_types::TileData::has_building_group)
    {
        return true;
    }
    ctx.chunks.tiles().any(|(_, tile)| {
        tile.groups
            .values()
            .any(|g| matches!(&g.activity, GroupActivity::Building(b) if b.site == site))
    })
}

fn scanned_structure_at(ctx: &DecisionContext<'_>, at: TileCoord) -> bool {
    ctx.scan
        .monster_structures
        .iter()
        .chain(&ctx.scan.player_spawns)
        .chain(&ctx.scan.player_structures)
        .any(|s| s.coord() == at)
}

/// Distinct monster structures within the density radius of `center`,
/// counting both the scan and the loaded chunks.
pub fn monster_structures_near(ctx: &DecisionContext<'_>, center: TileCoord) -> usize {
    let radius = ctx.config.structure_density_radius;
    let scanned = ctx
        .scan
        .monster_structures
        .iter()
        .filter(|s| s.coord().distance(center) <= radius)
        .map(|s| s.structure.id);
    let cached = ctx
        .chunks
        .structures_within(center, radius)
        .filter(|s| s.monster)
        .map(|s| s.id);
    scanned.chain(cached).collect::<BTreeSet<_>>().len()
}

/// Personality-weighted draw among the monster kinds the group can afford.
pub fn choose_structure_kind(group: &Group, rng: &mut dyn RandomSource) -> Option<StructureKind> {
    let personality = group.personality();
    let weighted: Vec<(StructureKind, f64)> = StructureKind::MONSTER_BUILDABLE
        .into_iter()
        .map(|kind| {
            let affordable = group.items.covers(&blueprint(kind).build_cost);
            let weight = if affordable { kind_weight(kind, personality) } else { 0.0 };
            (kind, weight)
        })
        .collect();

    let total: f64 = weighted.iter().map(|(_, w)| w).sum();
    if total <= 0.0 {
        return None;
    }
    let mut roll = rng.next_f64() * total;
    let mut last = None;
    for (kind, weight) in weighted {
        if weight <= 0.0 {
            continue;
        }
        last = Some(kind);
        if roll < weight {
            return Some(kind);
        }
        roll -= weight;
    }
    last
}

const fn kind_weight(kind: StructureKind, personality: Personality) -> f64 {
    match (kind, personality) {
        (StructureKind::MonsterHive, Personality::Greedy)
        | (StructureKind::MonsterWarcamp, Personality::Aggressive | Personality::Feral) => 2.0,
        (StructureKind::MonsterStronghold, Personality::Territorial | Personality::Builder) => 1.5,
        (StructureKind::MonsterStronghold, _) => 0.5,
        (StructureKind::MonsterLair | StructureKind::MonsterHive | StructureKind::MonsterWarcamp, _) => {
            1.0
        }
        _ => 0.0,
    }
}

// ---------------------------------------------------------------------------
// Upgrades
// ---------------------------------------------------------------------------

/// Raise a monster structure one level, paying from its store.
pub fn upgrade_structure(group: &Group, structure: &Structure, ctx: &DecisionContext<'_>) -> Outcome {
    if !structure.monster {
        return Outcome::Declined(DeclineReason::NotMonsterStructure);
    }
    let level = structure.current_level();
    if level >= ctx.config.max_structure_level {
        return Outcome::Declined(DeclineReason::MaxLevelReached);
    }

    let mut upgraded = structure.clone();
    let cost = structure_upgrade_cost(structure.kind, level);
    if consume_resources(&mut upgraded.items, &cost).is_err() {
        return Outcome::Declined(DeclineReason::InsufficientResources);
    }
    let next = level.saturating_add(1);
    upgraded.level = next;
    upgraded.last_upgraded = Some(ctx.now);
    upgraded.last_activity = Some(ctx.now);
    if let Some(feature) = feature_for_level(next) {
        upgraded.features.insert(feature);
    }

    debug!(group_id = %group.id, structure_id = %structure.id, level = next, "Structure upgraded");
    let text = format!("{} grows stronger (level {next})", structure.name);
    Outcome::Acted(
        Action::new(ActionKind::UpgradeStructure)
            .toward(structure.coord(), None)
            .on_structure(structure.id)
            .with(Mutation::put_structure(upgraded))
            .with(Mutation::Chat(ChatMessage::event(
                text,
                structure.coord(),
                ctx.now,
            ))),
    )
}

/// Add an inner building the structure lacks and can pay for, chosen at
/// random.
pub fn add_building(
    group: &Group,
    structure: &Structure,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    if !structure.monster {
        return Outcome::Declined(DeclineReason::NotMonsterStructure);
    }
    let present: BTreeSet<BuildingKind> = structure.buildings.values().map(|b| b.kind).collect();
    let missing: Vec<BuildingKind> = BuildingKind::ALL
        .into_iter()
        .filter(|k| !present.contains(k))
        .collect();
    if missing.is_empty() {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    }
    let affordable: Vec<BuildingKind> = missing
        .into_iter()
        .filter(|k| structure.items.covers(&building_blueprint(*k).cost))
        .collect();
    let Some(kind) = pick(rng, &affordable).copied() else {
        return Outcome::Declined(DeclineReason::InsufficientResources);
    };

    let bp = building_blueprint(kind);
    let mut updated = structure.clone();
    if consume_resources(&mut updated.items, &bp.cost).is_err() {
        return Outcome::Declined(DeclineReason::ResourceConsumptionFailed);
    }
    updated.buildings.insert(BuildingId::new(), InnerBuilding {
        kind,
        level: 1,
        upgraded_at: Some(ctx.now),
    });
    updated.last_activity = Some(ctx.now);

    debug!(group_id = %group.id, structure_id = %structure.id, building = ?kind, "Building added");
    let text = format!("{} adds a {} to {}", group.name, bp.name, structure.name);
    Outcome::Acted(
        Action::new(ActionKind::AddBuilding)
            .toward(structure.coord(), None)
            .on_structure(structure.id)
            .with(Mutation::put_structure(updated))
            .with(Mutation::Chat(ChatMessage::event(
                text,
                structure.coord(),
                ctx.now,
            ))),
    )
}

/// Raise one inner building a level, paying from the structure's store.
pub fn upgrade_building(
    group: &Group,
    structure: &Structure,
    building_id: BuildingId,
    ctx: &DecisionContext<'_>,
) -> Outcome {
    if !structure.monster {
        return Outcome::Declined(DeclineReason::NotMonsterStructure);
    }
    let Some(building) = structure.buildings.get(&building_id) else {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    };
    let level = building.level.max(1);
    if level >= ctx.config.max_building_level {
        return Outcome::Declined(DeclineReason::MaxLevelReached);
    }

    let kind = building.kind;
    let mut updated = structure.clone();
    let cost = building_upgrade_cost(kind, level);
    if consume_resources(&mut updated.items, &cost).is_err() {
        return Outcome::Declined(DeclineReason::InsufficientResources);
    }
    let next = level.saturating_add(1);
    if let Some(b) = updated.buildings.get_mut(&building_id) {
        b.level = next;
        b.upgraded_at = Some(ctx.now);
    }
    updated.last_activity = Some(ctx.now);

    debug!(group_id = %group.id, structure_id = %structure.id, building = ?kind, level = next, "Building upgraded");
    Outcome::Acted(
        Action::new(ActionKind::UpgradeBuilding)
            .toward(structure.coord(), None)
            .on_structure(structure.id)
            .with(Mutation::put_structure(updated)),
    )
}

/// Upgrade the lowest-level inner building that is below the cap.
pub fn upgrade_any_building(
    group: &Group,
    structure: &Structure,
    ctx: &DecisionContext<'_>,
) -> Outcome {
    let candidate = structure
        .buildings
        .iter()
        .filter(|(_, b)| b.level.max(1) < ctx.config.max_building_level)
        .min_by_key(|(id, b)| (b.level, **id))
        .map(|(id, _)| *id);
    match candidate {
        Some(id) => upgrade_building(group, structure, id, ctx),
        None if structure.buildings.is_empty() => {
            Outcome::Declined(DeclineReason::NoSuitableTarget)
        }
        None => Outcome::Declined(DeclineReason::MaxLevelReached),
    }
}

// ---------------------------------------------------------------------------
// Demobilisation and adoption
// ---------------------------------------------------------------------------

/// Deposit every carried item into `structure` and start demobilising.
pub fn demobilize(group: &Group, structure: &Structure, ctx: &DecisionContext<'_>) -> Outcome {
    if group.items.is_empty() {
        return Outcome::Declined(DeclineReason::NoItemsToDeposit);
    }
    if !structure.monster {
        return Outcome::Declined(DeclineReason::NotMonsterStructure);
    }

    let mut store = structure.clone();
    let mut depositor = group.clone();
    let deposited = depositor.items.total();
    store.items.absorb(std::mem::take(&mut depositor.items));
    store.last_activity = Some(ctx.now);
    depositor.activity = GroupActivity::Demobilising(DemobiliseState {
        target_structure: structure.id,
        demobilise_start: ctx.now,
    });

    debug!(group_id = %group.id, structure_id = %structure.id, deposited, "Loot deposited");
    Outcome::Acted(
        Action::new(ActionKind::Demobilise)
            .toward(structure.coord(), None)
            .on_structure(structure.id)
            .with(Mutation::put_structure(store))
            .with(Mutation::put_group(depositor)),
    )
}

/// Take over an unfinished structure.
pub fn adopt_structure(
    group: &Group,
    structure: &Structure,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    let cfg = ctx.config;
    if !structure.is_building() {
        return Outcome::Declined(DeclineReason::StructureNotBuilding);
    }
    if has_active_builder(group, structure, ctx) {
        return Outcome::Declined(DeclineReason::HasActiveBuilder);
    }

    let chance = match structure.owner {
        StructureOwner::Monster { .. } => {
            let bonus = matches!(
                group.personality(),
                Personality::Builder | Personality::Territorial
            );
            if bonus {
                cfg.adopt_monster_chance + cfg.adopt_personality_bonus
            } else {
                cfg.adopt_monster_chance
            }
        }
        StructureOwner::Player { .. } => {
            let window = TimeDelta::hours(cfg.adopt_inactivity_hours);
            let abandoned = structure
                .last_activity
                .is_none_or(|at| ctx.now.signed_duration_since(at) >= window);
            if !structure.monster_friendly && !abandoned {
                return Outcome::Declined(DeclineReason::NotMonsterFriendly);
            }
            cfg.adopt_player_chance
        }
    };
    if !rng.chance(chance) {
        return Outcome::Declined(DeclineReason::RandomRejection);
    }

    let mut adopted = structure.clone();
    adopted.owner = StructureOwner::Monster { group_id: group.id };
    adopted.owner_name = group.name.clone();
    adopted.monster = true;
    adopted.builder = Some(group.id);
    adopted.last_activity = Some(ctx.now);

    let mut builder = group.clone();
    builder.activity = GroupActivity::Building(BuildingState {
        structure_id: structure.id,
        site: structure.coord(),
        building_started: ctx.now,
    });
    builder.memory.preferred_structure_id = Some(structure.id);
    builder.home_structure = Some(structure.id);

    debug!(group_id = %group.id, structure_id = %structure.id, "Structure adopted");
    let text = format!("{} takes over the half-built {}", group.name, structure.name);
    Outcome::Acted(
        Action::new(ActionKind::Adopt)
            .toward(structure.coord(), None)
            .on_structure(structure.id)
            .with(Mutation::put_structure(adopted))
            .with(Mutation::put_group(builder))
            .with(Mutation::Chat(ChatMessage::event(
                text,
                structure.coord(),
                ctx.now,
            ))),
    )
}

/// Whether another group is currently building `structure`.
fn has_active_builder(group: &Group, structure: &Structure, ctx: &DecisionContext<'_>) -> bool {
    ctx.chunks.tiles().any(|(_, tile)| {
        tile.groups.values().any(|g| {
            g.id != group.id
                && matches!(&g.activity, GroupActivity::Building(b) if b.structure_id == structure.id)
        })
    })
}
