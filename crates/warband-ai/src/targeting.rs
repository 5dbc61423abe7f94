//! Target selection.
//!
//! Picks one destination for an idle group, trying in order:
//!
//! 1. an explicit raid order
//! 2. the exploration redirect toward nearby player spawns
//! 3. an attackable neighbour (taken as a one-tile hop)
//! 4. the group's home structure
//! 5. a weighted draw across the scan categories
//!
//! `None` means nothing qualified and the caller should wander. A target on
//! terrain the group cannot enter is moved to the nearest enterable tile by
//! an expanding ring search, or dropped.

use tracing::debug;

use warband_types::{Direction, Group, Personality, StructureId, TargetKind, TileCoord};
use warband_world::Mobility;

use crate::context::DecisionContext;
use crate::personality::is_bold;
use crate::power::{group_power, summary_power};
use crate::random::{RandomSource, pick};

/// Player spawns considered by the exploration redirect.
const EXPLORATION_SPAWN_CHOICES: usize = 3;

/// A resolved movement target.
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Destination tile (already relocated onto enterable terrain).
    pub coord: TileCoord,
    /// Semantic type.
    pub kind: TargetKind,
    /// Structure at the destination, when the target is one.
    pub structure_id: Option<StructureId>,
    /// Whether the move must be a single-tile hop.
    pub hop: bool,
    /// Max distance of the category the target was drawn from.
    pub max_distance: f64,
}

/// Choose a target for `group`, or `None` to fall back to wandering.
pub fn select_target(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Option<Target> {
    let raw = explicit_order(group, ctx)
        .or_else(|| exploration_redirect(group, ctx, rng))
        .or_else(|| adjacent_opportunity(group, ctx, rng))
        .or_else(|| home_preference(group, ctx, rng))
        .or_else(|| weighted_choice(group, ctx, rng))?;

    let target = settle_on_terrain(group, raw, ctx);
    match &target {
        Some(t) => debug!(
            group_id = %group.id,
            kind = ?t.kind,
            x = t.coord.x,
            y = t.coord.y,
            "Target selected"
        ),
        None => debug!(group_id = %group.id, "Target discarded: no enterable tile nearby"),
    }
    target
}

/// Relocate a target onto enterable terrain, keeping it within its
/// category distance.
fn settle_on_terrain(group: &Group, target: Target, ctx: &DecisionContext<'_>) -> Option<Target> {
    let coord = relocate_target(
        group.coord(),
        target.coord,
        Mobility::of(group),
        ctx,
        ctx.config.ring_search_radius,
        target.max_distance,
    )?;
    Some(Target { coord, ..target })
}

/// Nearest tile to `target` the group can enter, searched in rings of
/// growing Chebyshev radius up to `radius`. Candidates farther than
/// `max_distance` from `origin` are skipped. Ties break on row then column.
pub fn relocate_target(
    origin: TileCoord,
    target: TileCoord,
    mobility: Mobility,
    ctx: &DecisionContext<'_>,
    radius: u32,
    max_distance: f64,
) -> Option<TileCoord> {
    let acceptable =
        |at: TileCoord| mobility.can_enter(ctx.terrain, at) && origin.distance(at) <= max_distance;

    if acceptable(target) {
        return Some(target);
    }
    for r in 1..=radius {
        let found = ring(target, r)
            .into_iter()
            .filter(|at| acceptable(*at))
            .min_by(|a, b| {
                target
                    .distance(*a)
                    .total_cmp(&target.distance(*b))
                    .then_with(|| (a.y, a.x).cmp(&(b.y, b.x)))
            });
        if found.is_some() {
            return found;
        }
    }
    None
}

/// Tiles at exactly Chebyshev distance `r` from `center`.
fn ring(center: TileCoord, r: u32) -> Vec<TileCoord> {
    let r = i32::try_from(r).unwrap_or(i32::MAX);
    let mut tiles = Vec::new();
    for dy in r.saturating_neg()..=r {
        for dx in r.saturating_neg()..=r {
            if dx.abs().max(dy.abs()) == r {
                tiles.push(center.offset(dx, dy));
            }
        }
    }
    tiles
}

// ---------------------------------------------------------------------------
// Priority steps
// ---------------------------------------------------------------------------

fn explicit_order(group: &Group, ctx: &DecisionContext<'_>) -> Option<Target> {
    let id = group.memory.target_structure?;
    let found = ctx.scan.find_structure(id)?;
    let distance = group.coord().distance(found.coord());
    if distance < 1.0 || distance > ctx.config.max_scan_distance {
        return None;
    }
    Some(Target {
        coord: found.coord(),
        kind: TargetKind::ExplicitOrder,
        structure_id: Some(id),
        hop: false,
        max_distance: ctx.config.max_scan_distance,
    })
}

fn exploration_redirect(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Option<Target> {
    if !group.memory.is_exploring() {
        return None;
    }
    let source = group.memory.mobilized_from_structure?;
    ctx.scan.find_structure(source)?;

    let here = group.coord();
    let max = ctx.config.player_spawn_max_distance;
    let mut spawns: Vec<_> = ctx
        .scan
        .player_spawns
        .iter()
        .map(|s| (here.distance(s.coord()), s))
        .filter(|(d, _)| *d >= 1.0 && *d <= max)
        .collect();
    spawns.sort_by(|a, b| a.0.total_cmp(&b.0));
    spawns.truncate(EXPLORATION_SPAWN_CHOICES);

    let (_, spawn) = pick(rng, &spawns)?;
    Some(Target {
        coord: spawn.coord(),
        kind: TargetKind::PlayerSpawn,
        structure_id: Some(spawn.structure.id),
        hop: false,
        max_distance: max,
    })
}

fn adjacent_opportunity(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Option<Target> {
    if !rng.chance(ctx.weights_for(group).opportunism()) {
        return None;
    }
    let mut found = Vec::new();
    for direction in Direction::ALL {
        let at = group.coord().step(direction);
        if !ctx.can_enter(group, at) {
            continue;
        }
        let Some(tile) = ctx.chunks.tile(at) else {
            continue;
        };
        if let Some(structure) = tile.structure.as_ref().filter(|s| !s.monster && !s.in_battle()) {
            found.push((at, TargetKind::AdjacentStructure, Some(structure.id)));
        } else if tile.groups.values().any(|g| !g.is_monster() && !g.in_battle()) {
            found.push((at, TargetKind::AdjacentGroup, None));
        }
    }
    let (coord, kind, structure_id) = pick(rng, &found).copied()?;
    Some(Target {
        coord,
        kind,
        structure_id,
        hop: true,
        max_distance: ctx.config.hop_distance,
    })
}

fn home_preference(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Option<Target> {
    if group.memory.is_exploring() {
        return None;
    }
    let home = group.memory.preferred_structure_id?;
    let mut chance = ctx.config.home_preference_chance;
    if group.personality() == Personality::Territorial {
        chance *= 2.0;
    }
    if !rng.chance(chance) {
        return None;
    }
    let found = ctx.scan.find_structure(home)?;
    let distance = group.coord().distance(found.coord());
    if distance < 1.0 || distance > ctx.config.max_scan_distance {
        return None;
    }
    Some(Target {
        coord: found.coord(),
        kind: TargetKind::MonsterHome,
        structure_id: Some(home),
        hop: false,
        max_distance: ctx.config.max_scan_distance,
    })
}

// ---------------------------------------------------------------------------
// Weighted category choice
// ---------------------------------------------------------------------------

/// One category of the priority table.
struct Category {
    kind: TargetKind,
    weight: f64,
    max_distance: f64,
}

/// One weighted candidate.
struct Candidate {
    coord: TileCoord,
    kind: TargetKind,
    structure_id: Option<StructureId>,
    weight: f64,
    max_distance: f64,
}

/// Category weights after personality, group size and exploration
/// modifiers. The monster-group category only exists for weak groups.
fn category_table(group: &Group, own_power: f64, ctx: &DecisionContext<'_>) -> Vec<Category> {
    let cfg = ctx.config;
    let w = ctx.weights_for(group);
    let units = group.unit_count();
    let exploring = group.memory.is_exploring();

    let mut monster_structure = cfg.monster_structure_weight * w.build;
    let mut resource = cfg.resource_weight * w.gather;
    let mut player_spawn = cfg.player_spawn_weight * w.attack;
    let player_structure = cfg.player_structure_weight * w.attack;

    if units >= cfg.large_group_units {
        player_spawn *= 1.5;
        resource *= 0.7;
    } else if units <= cfg.small_group_units {
        player_spawn *= 0.5;
        resource *= 1.5;
    }
    if exploring {
        player_spawn *= cfg.exploration_spawn_multiplier;
        monster_structure *= cfg.exploration_home_multiplier;
    }

    let mut table = vec![
        Category {
            kind: TargetKind::MonsterStructure,
            weight: monster_structure,
            max_distance: cfg.monster_structure_max_distance,
        },
        Category {
            kind: TargetKind::ResourceHotspot,
            weight: resource,
            max_distance: cfg.resource_max_distance,
        },
        Category {
            kind: TargetKind::PlayerSpawn,
            weight: player_spawn,
            max_distance: cfg.player_spawn_max_distance,
        },
        Category {
            kind: TargetKind::PlayerStructure,
            weight: player_structure,
            max_distance: cfg.player_structure_max_distance,
        },
    ];
    if own_power < cfg.weak_group_power {
        table.push(Category {
            kind: TargetKind::MonsterGroup,
            weight: cfg.monster_group_weight * w.explore,
            max_distance: cfg.monster_group_max_distance,
        });
    }
    table
}

/// Locations of one category as `(coord, structure, defence power)`.
fn category_locations(
    kind: TargetKind,
    group: &Group,
    ctx: &DecisionContext<'_>,
) -> Vec<(TileCoord, Option<StructureId>, Option<f64>)> {
    let scan = ctx.scan;
    match kind {
        TargetKind::MonsterStructure => scan
            .monster_structures
            .iter()
            .map(|s| (s.coord(), Some(s.structure.id), None))
            .collect(),
        TargetKind::ResourceHotspot => scan
            .resource_hotspots
            .iter()
            .filter(|h| h.amount > 0)
            .map(|h| (h.coord(), None, None))
            .collect(),
        TargetKind::PlayerSpawn => scan
            .player_spawns
            .iter()
            .map(|s| (s.coord(), Some(s.structure.id), Some(summary_power(&s.structure))))
            .collect(),
        TargetKind::PlayerStructure => scan
            .player_structures
            .iter()
            .map(|s| (s.coord(), Some(s.structure.id), Some(summary_power(&s.structure))))
            .collect(),
        TargetKind::MonsterGroup => scan
            .monster_groups
            .iter()
            .filter(|g| g.id != group.id && g.race == group.race)
            .map(|g| (g.coord(), None, None))
            .collect(),
        _ => Vec::new(),
    }
}

fn weighted_choice(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Option<Target> {
    let here = group.coord();
    let own_power = group_power(group);
    let tolerance = ctx.weights_for(group).power_tolerance;
    let bypass_gate = is_bold(group.personality())
        && own_power < ctx.config.weak_group_power
        && rng.chance(ctx.config.weak_bypass_chance);

    let mut candidates = Vec::new();
    for category in category_table(group, own_power, ctx) {
        if category.weight <= 0.0 || category.max_distance <= 0.0 {
            continue;
        }
        for (coord, structure_id, defence) in category_locations(category.kind, group, ctx) {
            let distance = here.distance(coord);
            if distance < 1.0 || distance > category.max_distance {
                continue;
            }
            if let Some(defence) = defence
                && !bypass_gate
                && defence * tolerance > own_power
            {
                continue;
            }
            let weight = category.weight * (1.0 - distance / category.max_distance);
            if weight > 0.0 {
                candidates.push(Candidate {
                    coord,
                    kind: category.kind,
                    structure_id,
                    weight,
                    max_distance: category.max_distance,
                });
            }
        }
    }

    let chosen = draw(&candidates, rng)?;
    Some(Target {
        coord: chosen.coord,
        kind: chosen.kind,
        structure_id: chosen.structure_id,
        hop: false,
        max_distance: chosen.max_distance,
    })
}

/// Cumulative weighted draw.
fn draw<'a>(candidates: &'a [Candidate], rng: &mut dyn RandomSource) -> Option<&'a Candidate> {
    let total: f64 = candidates.iter().map(|c| c.weight).sum();
    if total <= 0.0 {
        return None;
    }
    let roll = rng.next_f64() * total;
    let mut cumulative = 0.0;
    for candidate in candidates {
        cumulative += candidate.weight;
        if roll < cumulative {
            return Some(candidate);
        }
    }
    candidates.last()
}
