//! Purposeful wandering.
//!
//! When no strategic target qualifies, a group does not walk at random. It
//! picks a heading from a personality heuristic, looks along that heading
//! for something interesting (resources, a biome change, a shoreline) and
//! moves toward it, or simply toward a point ahead on the heading.

use warband_types::{Direction, Group, Personality, TargetKind, TileCoord};
use warband_world::{Mobility, compute_path};

use crate::context::DecisionContext;
use crate::movement::{issue_move, step_budget};
use crate::outcome::{ActionKind, DeclineReason, Outcome};
use crate::random::{RandomSource, shuffle};
use crate::targeting::relocate_target;

/// Chance a nomad keeps its preferred heading.
const NOMAD_KEEP_HEADING: f64 = 0.7;

/// Chance a feral group picks a fresh heading.
const FERAL_NEW_HEADING: f64 = 0.6;

/// Landmark interest: tile holds gatherable resources.
const INTEREST_RESOURCES: f64 = 3.0;

/// Landmark interest: biome differs from the current one.
const INTEREST_BIOME_CHANGE: f64 = 2.0;

/// Landmark interest: enterable tile bordering impassable terrain.
const INTEREST_EDGE: f64 = 1.0;

/// Landmarks closer than this are ignored.
const MIN_LANDMARK_DISTANCE: f64 = 2.0;

/// Move somewhere interesting, or at least somewhere new.
pub fn purposeful_wander(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    let here = group.coord();
    let mobility = Mobility::of(group);
    let heading = choose_heading(group, ctx, rng);

    let (destination, kind) = if ctx.config.purposeful_wander {
        find_landmark(group, heading, ctx)
            .map_or_else(|| (ahead(here, heading, ctx), TargetKind::Wander), |at| {
                (at, TargetKind::Landmark)
            })
    } else {
        (ahead(here, heading, ctx), TargetKind::Wander)
    };

    let mut remembered = group.clone();
    remembered.memory.preferred_direction = Some(heading);

    if let Some(destination) = relocate_target(
        here,
        destination,
        mobility,
        ctx,
        ctx.config.ring_search_radius,
        ctx.config.max_scan_distance,
    ) && destination != here
    {
        let budget = step_budget(ctx.config, rng);
        let path = compute_path(here, destination, budget, mobility, ctx.terrain);
        if path.steps() > 0 {
            return Outcome::Acted(issue_move(
                remembered,
                path.points,
                destination,
                kind,
                ActionKind::Wander,
                ctx,
                rng,
            ));
        }
    }

    // Fall back to any single enterable step, heading first.
    let mut others: Vec<Direction> = Direction::ALL.into_iter().filter(|d| *d != heading).collect();
    shuffle(rng, &mut others);
    let step = std::iter::once(heading)
        .chain(others)
        .map(|d| here.step(d))
        .find(|at| mobility.can_enter(ctx.terrain, *at));

    match step {
        Some(next) => Outcome::Acted(issue_move(
            remembered,
            vec![here, next],
            next,
            TargetKind::Wander,
            ActionKind::Wander,
            ctx,
            rng,
        )),
        None if !mobility.can_traverse_water() => {
            Outcome::Declined(DeclineReason::SurroundedByWater)
        }
        None => Outcome::Declined(DeclineReason::BlockedByTerrain),
    }
}

/// Pick a heading from the group's personality and memory.
pub fn choose_heading(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Direction {
    let here = group.coord();
    let preferred = group.memory.preferred_direction;
    if !ctx.config.purposeful_wander {
        return random_heading(rng);
    }
    match group.personality() {
        Personality::Nomadic => match preferred {
            Some(d) if rng.chance(NOMAD_KEEP_HEADING) => d,
            _ => random_heading(rng),
        },
        Personality::Territorial => {
            let origin = group
                .memory
                .mobilized_from_structure
                .or(group.memory.preferred_structure_id)
                .and_then(|id| ctx.scan.find_structure(id))
                .map(warband_types::ScannedStructure::coord);
            match origin.and_then(|o| heading_between(o, here).map(|d| (o, d))) {
                // Head back once too far out, otherwise circle clockwise.
                Some((o, away)) if here.distance(o) > f64::from(ctx.config.wander_radius) => {
                    away.rotate(4)
                }
                Some((_, away)) => away.rotate(2),
                None => random_heading(rng),
            }
        }
        Personality::Aggressive => {
            heading_between(here, ctx.config.world_center).unwrap_or_else(|| random_heading(rng))
        }
        Personality::Feral => match preferred {
            Some(d) if !rng.chance(FERAL_NEW_HEADING) => d,
            _ => random_heading(rng),
        },
        _ => match preferred {
            Some(d) => d.rotate(rng.range_i32(-1, 1)),
            None => random_heading(rng),
        },
    }
}

/// Most interesting enterable tile roughly along `heading` within the
/// landmark search radius, scored by interest minus a distance penalty.
pub fn find_landmark(
    group: &Group,
    heading: Direction,
    ctx: &DecisionContext<'_>,
) -> Option<TileCoord> {
    let here = group.coord();
    let mobility = Mobility::of(group);
    let radius = ctx.config.landmark_search_radius.max(0);
    let home_biome = ctx.biome_at(here);
    let allowed = [heading.rotate(-1), heading, heading.rotate(1)];

    let mut best: Option<(f64, TileCoord)> = None;
    for dy in radius.saturating_neg()..=radius {
        for dx in radius.saturating_neg()..=radius {
            let at = here.offset(dx, dy);
            let distance = here.distance(at);
            if distance < MIN_LANDMARK_DISTANCE || distance > f64::from(radius) {
                continue;
            }
            if !heading_between(here, at).is_some_and(|d| allowed.contains(&d)) {
                continue;
            }
            if !mobility.can_enter(ctx.terrain, at) {
                continue;
            }
            let interest = landmark_interest(at, &home_biome, mobility, ctx);
            if interest <= 0.0 {
                continue;
            }
            let score = interest - distance * ctx.config.landmark_distance_penalty;
            if score > 0.0 && best.is_none_or(|(s, _)| score > s) {
                best = Some((score, at));
            }
        }
    }
    best.map(|(_, at)| at)
}

fn landmark_interest(
    at: TileCoord,
    home_biome: &str,
    mobility: Mobility,
    ctx: &DecisionContext<'_>,
) -> f64 {
    let mut interest = 0.0;
    if ctx.chunks.tile(at).is_some_and(warband_types::TileData::has_resources) {
        interest += INTEREST_RESOURCES;
    }
    if ctx.biome_at(at) != home_biome {
        interest += INTEREST_BIOME_CHANGE;
    }
    if at.neighbors().iter().any(|n| !mobility.can_enter(ctx.terrain, *n)) {
        interest += INTEREST_EDGE;
    }
    interest
}

/// Point `wander_radius` tiles ahead along `heading`.
fn ahead(here: TileCoord, heading: Direction, ctx: &DecisionContext<'_>) -> TileCoord {
    let (dx, dy) = heading.delta();
    let r = ctx.config.wander_radius.max(1);
    here.offset(dx.saturating_mul(r), dy.saturating_mul(r))
}

fn heading_between(from: TileCoord, to: TileCoord) -> Option<Direction> {
    Direction::from_vector(
        f64::from(to.x) - f64::from(from.x),
        f64::from(to.y) - f64::from(from.y),
    )
}

fn random_heading(rng: &mut dyn RandomSource) -> Direction {
    Direction::from_index(rng.pick_index(Direction::ALL.len()).unwrap_or(0))
}
