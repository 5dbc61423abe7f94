//! Interrupt evaluation for moving groups.
//!
//! A group on the march re-examines its surroundings each tick once the
//! grace period after issuing the move has passed. Checks run in a fixed
//! order and each one is gated by the archetype's interrupt threshold: a
//! roll below the threshold skips that check.

use chrono::TimeDelta;
use tracing::debug;

use warband_types::{BattleId, Group, StructureId, TargetKind};
use warband_world::Mobility;

use crate::context::DecisionContext;
use crate::inventory::is_resource_poor;
use crate::personality::{PersonalityWeights, is_bold};
use crate::power::{combined_power, estimate_structure_power, group_power, power_ratio, summary_power};
use crate::random::RandomSource;
use crate::targeting::{Target, relocate_target};

/// Why a move should be abandoned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterruptReason {
    /// A battle is raging on the current tile.
    JoinBattle,
    /// Player groups on the tile look beatable.
    AttackPlayers,
    /// A non-monster structure on the tile looks beatable.
    AttackStructure,
    /// Rival monster groups on the tile (aggressive archetypes only).
    AttackMonsters,
    /// The group is short on items and the tile has resources.
    Gather,
    /// A higher-priority target came into range.
    PursueTarget,
}

/// A structured interrupt result.
#[derive(Debug, Clone, PartialEq)]
pub struct InterruptDecision {
    /// Reason for interrupting.
    pub reason: InterruptReason,
    /// Battle to join, for [`InterruptReason::JoinBattle`].
    pub battle_id: Option<BattleId>,
    /// Structure involved, if any.
    pub structure_id: Option<StructureId>,
    /// New destination, for [`InterruptReason::PursueTarget`].
    pub target: Option<Target>,
}

impl InterruptDecision {
    const fn new(reason: InterruptReason) -> Self {
        Self {
            reason,
            battle_id: None,
            structure_id: None,
            target: None,
        }
    }

    /// Whether the decision acts on the current tile rather than
    /// redirecting the march.
    pub const fn is_immediate(&self) -> bool {
        !matches!(self.reason, InterruptReason::PursueTarget)
    }
}

/// Decide whether a moving group should abandon its path.
pub fn evaluate_interrupt(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Option<InterruptDecision> {
    let movement = group.movement()?;
    let grace = TimeDelta::seconds(i64::from(ctx.config.interrupt_grace_secs));
    if ctx.now.signed_duration_since(movement.move_started) < grace {
        return None;
    }

    let w = ctx.weights_for(group);
    let here = group.coord();
    let threshold = w.interrupt_threshold;

    let decision = gated(rng, threshold, |_| check_battle(group, ctx))
        .or_else(|| gated(rng, threshold, |rng| check_players(group, &w, ctx, rng)))
        .or_else(|| gated(rng, threshold, |rng| check_structure(group, &w, ctx, rng)))
        .or_else(|| gated(rng, threshold, |_| check_monsters(group, &w, ctx)))
        .or_else(|| gated(rng, threshold, |_| check_gather(group, ctx)))
        .or_else(|| {
            gated(rng, threshold, |_| {
                check_pursuit(group, movement.target_kind, &w, ctx)
            })
        });

    if let Some(d) = &decision {
        debug!(group_id = %group.id, x = here.x, y = here.y, reason = ?d.reason, "Move interrupted");
    }
    decision
}

/// Run `check` only if the threshold roll passes.
fn gated(
    rng: &mut dyn RandomSource,
    threshold: f64,
    check: impl FnOnce(&mut dyn RandomSource) -> Option<InterruptDecision>,
) -> Option<InterruptDecision> {
    if rng.next_f64() < threshold {
        return None;
    }
    check(rng)
}

fn check_battle(group: &Group, ctx: &DecisionContext<'_>) -> Option<InterruptDecision> {
    let battle = ctx
        .chunks
        .battles_at(group.coord())
        .find(|b| !b.involves(group.id))?;
    Some(InterruptDecision {
        battle_id: Some(battle.id),
        ..InterruptDecision::new(InterruptReason::JoinBattle)
    })
}

fn check_players(
    group: &Group,
    w: &PersonalityWeights,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Option<InterruptDecision> {
    let players: Vec<&Group> = ctx
        .chunks
        .groups_at(group.coord())
        .filter(|g| !g.is_monster() && !g.in_battle())
        .collect();
    if players.is_empty() {
        return None;
    }
    let ratio = power_ratio(group_power(group), combined_power(players.iter().copied()));
    worth_the_fight(group, ratio, w, ctx, rng)
        .then(|| InterruptDecision::new(InterruptReason::AttackPlayers))
}

fn check_structure(
    group: &Group,
    w: &PersonalityWeights,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Option<InterruptDecision> {
    let structure = ctx
        .chunks
        .structure_at(group.coord())
        .filter(|s| !s.monster && !s.in_battle())?;
    let ratio = power_ratio(group_power(group), estimate_structure_power(structure));
    worth_the_fight(group, ratio, w, ctx, rng).then(|| InterruptDecision {
        structure_id: Some(structure.id),
        ..InterruptDecision::new(InterruptReason::AttackStructure)
    })
}

fn check_monsters(
    group: &Group,
    w: &PersonalityWeights,
    ctx: &DecisionContext<'_>,
) -> Option<InterruptDecision> {
    if !w.monster_aggression {
        return None;
    }
    ctx.chunks
        .groups_at(group.coord())
        .any(|g| g.is_monster() && g.race != group.race && !g.in_battle())
        .then(|| InterruptDecision::new(InterruptReason::AttackMonsters))
}

fn check_gather(group: &Group, ctx: &DecisionContext<'_>) -> Option<InterruptDecision> {
    if !is_resource_poor(&group.items, ctx.config.resource_poor_threshold) {
        return None;
    }
    ctx.chunks
        .tile(group.coord())
        .is_some_and(warband_types::TileData::has_resources)
        .then(|| InterruptDecision::new(InterruptReason::Gather))
}

/// Look for a strictly higher-priority target within the scaled detection
/// radius, nearest first among equal priorities.
fn check_pursuit(
    group: &Group,
    current: TargetKind,
    w: &PersonalityWeights,
    ctx: &DecisionContext<'_>,
) -> Option<InterruptDecision> {
    let here = group.coord();
    let radius = ctx.config.detection_radius * w.detection_scale;
    let floor = priority(current);

    let structures = ctx
        .scan
        .player_spawns
        .iter()
        .map(|s| (s.coord(), TargetKind::PlayerSpawn, Some(s.structure.id)))
        .chain(ctx.scan.player_structures.iter().filter_map(|s| {
            let beatable = group_power(group) >= summary_power(&s.structure) * w.power_tolerance;
            beatable.then_some((s.coord(), TargetKind::PlayerStructure, Some(s.structure.id)))
        }));
    let hotspots = ctx
        .scan
        .resource_hotspots
        .iter()
        .map(|h| (h.coord(), TargetKind::ResourceHotspot, None));

    let (coord, kind, structure_id) = structures
        .chain(hotspots)
        .filter(|(at, kind, _)| {
            let d = here.distance(*at);
            d >= 1.0 && d <= radius && priority(*kind) > floor
        })
        .min_by(|a, b| {
            priority(b.1)
                .cmp(&priority(a.1))
                .then_with(|| here.distance(a.0).total_cmp(&here.distance(b.0)))
        })?;

    let coord = relocate_target(
        here,
        coord,
        Mobility::of(group),
        ctx,
        ctx.config.ring_search_radius,
        radius,
    )?;
    Some(InterruptDecision {
        structure_id,
        target: Some(Target {
            coord,
            kind,
            structure_id,
            hop: false,
            max_distance: radius,
        }),
        ..InterruptDecision::new(InterruptReason::PursueTarget)
    })
}

/// Accept a fight when the power ratio meets the archetype's tolerance, or
/// recklessly for bold archetypes.
pub(crate) fn worth_the_fight(
    group: &Group,
    ratio: f64,
    w: &PersonalityWeights,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> bool {
    ratio >= w.power_tolerance
        || (is_bold(group.personality()) && rng.chance(ctx.config.reckless_attack_chance))
}

/// Relative importance of a target kind when deciding to change course.
pub const fn priority(kind: TargetKind) -> u8 {
    match kind {
        TargetKind::ExplicitOrder => 5,
        TargetKind::AdjacentStructure | TargetKind::AdjacentGroup => 4,
        TargetKind::PlayerSpawn | TargetKind::PlayerStructure => 3,
        TargetKind::ResourceHotspot => 2,
        TargetKind::MonsterStructure | TargetKind::MonsterHome | TargetKind::MonsterGroup => 1,
        TargetKind::Landmark | TargetKind::Wander => 0,
    }
}
