//! Movement execution and progression.
//!
//! Turns a [`Target`] into a movement order: a one-tile hop for close
//! targets, otherwise a short bounded path with a random step budget. Each
//! order is one whole-record group write, so status, path, timing and
//! destination never land partially. [`advance_movement`] walks an issued
//! path one waypoint at a time as the step timer elapses.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use warband_types::{
    ChatMessage, Direction, Group, GroupActivity, MovementState, Mutation, TargetKind, TileCoord,
};
use warband_world::{Mobility, compute_path};

use crate::config::AiConfig;
use crate::context::DecisionContext;
use crate::outcome::{Action, ActionKind, DeclineReason, Outcome};
use crate::random::{RandomSource, shuffle};
use crate::targeting::Target;
use crate::wander::purposeful_wander;

/// Issue a movement order toward `target`.
pub fn execute_move(
    group: &Group,
    target: &Target,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    let here = group.coord();
    let distance = here.distance(target.coord);
    if distance < 1.0 {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    }
    if target.hop || distance <= ctx.config.hop_distance {
        return hop_toward(group, target.coord, target.kind, ctx, rng);
    }

    let mobility = Mobility::of(group);
    let budget = step_budget(ctx.config, rng);
    let path = compute_path(here, target.coord, budget, mobility, ctx.terrain);
    if path.steps() > 0 {
        let action = issue_move(
            group.clone(),
            path.points,
            target.coord,
            target.kind,
            ActionKind::Move,
            ctx,
            rng,
        );
        return Outcome::Acted(action);
    }

    // Blocked on the very first step: try a closer enterable neighbour.
    if let Some(alternative) = closer_neighbour(group, target.coord, ctx) {
        debug!(
            group_id = %group.id,
            x = alternative.x,
            y = alternative.y,
            "Path blocked, stepping around"
        );
        let action = issue_move(
            group.clone(),
            vec![here, alternative],
            target.coord,
            target.kind,
            ActionKind::Move,
            ctx,
            rng,
        );
        return Outcome::Acted(action);
    }

    let blocked_by_water = path
        .blocked_at
        .is_some_and(|at| ctx.terrain.is_water(at) && !mobility.can_traverse_water());
    match purposeful_wander(group, ctx, rng) {
        Outcome::Declined(_) if blocked_by_water => Outcome::Declined(DeclineReason::BlockedByWater),
        other => other,
    }
}

/// Single-step move toward `destination`, trying the nearest compass
/// direction first and then the others in random order.
pub fn hop_toward(
    group: &Group,
    destination: TileCoord,
    kind: TargetKind,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    let here = group.coord();
    let dx = f64::from(destination.x) - f64::from(here.x);
    let dy = f64::from(destination.y) - f64::from(here.y);
    let Some(primary) = Direction::from_vector(dx, dy) else {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    };

    let mut alternatives: Vec<Direction> =
        Direction::ALL.into_iter().filter(|d| *d != primary).collect();
    shuffle(rng, &mut alternatives);

    let step = std::iter::once(primary)
        .chain(alternatives)
        .map(|d| here.step(d))
        .find(|at| ctx.can_enter(group, *at));

    match step {
        Some(next) => Outcome::Acted(issue_move(
            group.clone(),
            vec![here, next],
            destination,
            kind,
            ActionKind::Hop,
            ctx,
            rng,
        )),
        None => Outcome::Declined(DeclineReason::BlockedByTerrain),
    }
}

/// Build the movement write for `group` along `path`.
///
/// Consumes one exploration tick and emits a chat line for significant
/// destinations (and occasionally for exploratory ones).
pub fn issue_move(
    mut group: Group,
    path: Vec<TileCoord>,
    destination: TileCoord,
    kind: TargetKind,
    action_kind: ActionKind,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Action {
    let cfg = ctx.config;
    let mut speed = ctx.weights_for(&group).speed;
    if group.memory.is_exploring() {
        speed *= cfg.exploration_speed_boost;
    }

    group.activity = GroupActivity::Moving(MovementState {
        path,
        path_index: 0,
        move_started: ctx.now,
        move_speed: speed,
        target_x: destination.x,
        target_y: destination.y,
        target_kind: kind,
        next_move_time: next_step_at(ctx.now, speed, cfg),
    });
    group.memory.exploration_ticks = group.memory.exploration_ticks.saturating_sub(1);

    let announce = kind.is_significant()
        || (kind.is_exploratory() && rng.chance(cfg.exploratory_chat_chance));
    let chat = announce.then(|| {
        ChatMessage::event(
            format!("{} is marching toward {}", group.name, describe(kind)),
            group.coord(),
            ctx.now,
        )
    });

    let mut action = Action::new(action_kind)
        .toward(destination, Some(kind))
        .with(Mutation::put_group(group));
    if let Some(message) = chat {
        action = action.with(Mutation::Chat(message));
    }
    action
}

/// Advance a moving group one waypoint if its step timer has elapsed.
///
/// Reaching the last waypoint sets the group idle.
pub fn advance_movement(group: &Group, ctx: &DecisionContext<'_>) -> Outcome {
    let Some(state) = group.movement() else {
        return Outcome::Declined(DeclineReason::NoAction);
    };
    if ctx.now < state.next_move_time {
        return Outcome::Declined(DeclineReason::StillMoving);
    }

    let here = group.coord();
    let next_index = usize::try_from(state.path_index)
        .unwrap_or(usize::MAX)
        .saturating_add(1);
    let mut moved = group.clone();

    let Some(next) = state.path.get(next_index).copied() else {
        moved.activity = GroupActivity::Idle;
        return Outcome::Acted(Action::new(ActionKind::Arrive).with(Mutation::put_group(moved)));
    };

    moved.set_coord(next);
    let arrived = next_index.saturating_add(1) >= state.path.len();
    let kind = if arrived {
        moved.activity = GroupActivity::Idle;
        ActionKind::Arrive
    } else {
        if let GroupActivity::Moving(m) = &mut moved.activity {
            m.path_index = u32::try_from(next_index).unwrap_or(u32::MAX);
            m.next_move_time = next_step_at(ctx.now, m.move_speed, ctx.config);
        }
        ActionKind::Advance
    };

    let mut action = Action::new(kind).toward(next, Some(state.target_kind));
    if next != here {
        action = action.with(Mutation::RemoveGroup {
            at: here,
            group_id: group.id,
        });
    }
    Outcome::Acted(action.with(Mutation::put_group(moved)))
}

/// Time of the next step for a group moving at `speed`.
#[allow(clippy::cast_possible_truncation)] // bounded by step_secs * 10_000 ms
pub fn next_step_at(now: DateTime<Utc>, speed: f64, cfg: &AiConfig) -> DateTime<Utc> {
    let ms = (f64::from(cfg.step_secs) * 1000.0 / speed.max(0.1)).round();
    now.checked_add_signed(TimeDelta::milliseconds(ms as i64))
        .unwrap_or(now)
}

/// Random step budget in `[min_path_steps, max_path_steps]`.
pub fn step_budget(cfg: &AiConfig, rng: &mut dyn RandomSource) -> u32 {
    let lo = i32::try_from(cfg.min_path_steps.max(1)).unwrap_or(1);
    let hi = i32::try_from(cfg.max_path_steps).unwrap_or(lo).max(lo);
    u32::try_from(rng.range_i32(lo, hi)).unwrap_or(1)
}

/// Enterable neighbour strictly closer to `destination`, nearest first.
fn closer_neighbour(
    group: &Group,
    destination: TileCoord,
    ctx: &DecisionContext<'_>,
) -> Option<TileCoord> {
    let here = group.coord();
    let current = here.distance(destination);
    here.neighbors()
        .into_iter()
        .filter(|at| at.distance(destination) < current && ctx.can_enter(group, *at))
        .min_by(|a, b| a.distance(destination).total_cmp(&b.distance(destination)))
}

const fn describe(kind: TargetKind) -> &'static str {
    match kind {
        TargetKind::PlayerSpawn => "a player settlement",
        TargetKind::MonsterHome => "its lair",
        TargetKind::MonsterStructure => "a monster stronghold",
        TargetKind::ExplicitOrder => "its raid target",
        TargetKind::ResourceHotspot => "rich ground",
        TargetKind::PlayerStructure => "a player outpost",
        TargetKind::MonsterGroup => "its kin",
        TargetKind::AdjacentStructure | TargetKind::AdjacentGroup => "nearby prey",
        TargetKind::Landmark => "something interesting",
        TargetKind::Wander => "the unknown",
    }
}
