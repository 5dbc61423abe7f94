//! Per-group decision entry point.
//!
//! [`decide`] picks exactly one action for a monster group from its
//! current status:
//!
//! - **moving**: evaluate interrupts, otherwise advance along the path
//! - **idle**: run the priority chain (battle, merge, attacks, structure
//!   work, founding, gathering, movement)
//! - anything else is busy and waits for its own resolution
//!
//! The chain stops at the first component that acts.

use tracing::debug;

use warband_types::{Group, GroupActivity, Structure};

use crate::combat::{
    attack_monsters, attack_players, attack_structure, join_battle, join_specific_battle,
    merge_groups,
};
use crate::construction::{
    add_building, adopt_structure, demobilize, found_structure, upgrade_any_building,
    upgrade_structure,
};
use crate::context::DecisionContext;
use crate::gather::start_gathering;
use crate::interrupt::{InterruptDecision, InterruptReason, evaluate_interrupt, worth_the_fight};
use crate::inventory::is_resource_poor;
use crate::movement::{advance_movement, execute_move};
use crate::outcome::{DeclineReason, Outcome};
use crate::power::{combined_power, estimate_structure_power, group_power, power_ratio};
use crate::random::RandomSource;
use crate::targeting::select_target;
use crate::wander::purposeful_wander;

/// Decide what `group` does this tick.
pub fn decide(group: &Group, ctx: &DecisionContext<'_>, rng: &mut dyn RandomSource) -> Outcome {
    if !group.is_monster() {
        return Outcome::Declined(DeclineReason::NoAction);
    }
    let outcome = match &group.activity {
        GroupActivity::Idle => decide_idle(group, ctx, rng),
        GroupActivity::Moving(_) => decide_moving(group, ctx, rng),
        GroupActivity::Gathering(_)
        | GroupActivity::Building(_)
        | GroupActivity::Fighting(_)
        | GroupActivity::Demobilising(_) => Outcome::Declined(DeclineReason::Busy),
    };

    match &outcome {
        Outcome::Acted(action) => debug!(
            group_id = %group.id,
            status = group.activity.label(),
            action = %action.kind,
            mutations = action.mutations.len(),
            "Group acted"
        ),
        Outcome::Declined(reason) => debug!(
            group_id = %group.id,
            status = group.activity.label(),
            reason = %reason,
            "Group declined"
        ),
    }
    outcome
}

// ---------------------------------------------------------------------------
// Moving
// ---------------------------------------------------------------------------

fn decide_moving(group: &Group, ctx: &DecisionContext<'_>, rng: &mut dyn RandomSource) -> Outcome {
    if let Some(decision) = evaluate_interrupt(group, ctx, rng) {
        let outcome = act_on_interrupt(group, &decision, ctx, rng);
        if outcome.is_acted() {
            return outcome;
        }
    }
    advance_movement(group, ctx)
}

fn act_on_interrupt(
    group: &Group,
    decision: &InterruptDecision,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    match decision.reason {
        InterruptReason::JoinBattle => {
            let battle = decision
                .battle_id
                .and_then(|id| ctx.chunks.battles_at(group.coord()).find(|b| b.id == id));
            match battle {
                Some(battle) => join_specific_battle(group, battle, ctx, rng),
                None => join_battle(group, ctx, rng),
            }
        }
        InterruptReason::AttackPlayers => attack_players(group, ctx),
        InterruptReason::AttackStructure => attack_structure(group, ctx),
        InterruptReason::AttackMonsters => attack_monsters(group, ctx, rng),
        InterruptReason::Gather => start_gathering(group, ctx),
        InterruptReason::PursueTarget => match &decision.target {
            Some(target) => execute_move(group, target, ctx, rng),
            None => Outcome::Declined(DeclineReason::NoSuitableTarget),
        },
    }
}

// ---------------------------------------------------------------------------
// Idle
// ---------------------------------------------------------------------------

fn decide_idle(group: &Group, ctx: &DecisionContext<'_>, rng: &mut dyn RandomSource) -> Outcome {
    join_battle(group, ctx, rng)
        .or_else(|| merge_groups(group, ctx))
        .or_else(|| idle_attacks(group, ctx, rng))
        .or_else(|| structure_work(group, ctx, rng))
        .or_else(|| idle_found(group, ctx, rng))
        .or_else(|| idle_gather(group, ctx, rng))
        .or_else(|| move_or_wander(group, ctx, rng))
}

fn idle_attacks(group: &Group, ctx: &DecisionContext<'_>, rng: &mut dyn RandomSource) -> Outcome {
    let w = ctx.weights_for(group);
    let here = group.coord();
    let own = group_power(group);

    let players: Vec<&Group> = ctx
        .chunks
        .groups_at(here)
        .filter(|g| !g.is_monster() && !g.in_battle())
        .collect();
    let opposing = combined_power(players.iter().copied());
    if !players.is_empty() && worth_the_fight(group, power_ratio(own, opposing), &w, ctx, rng) {
        return attack_players(group, ctx);
    }

    if let Some(structure) = ctx
        .chunks
        .structure_at(here)
        .filter(|s| !s.monster && !s.in_battle())
    {
        let ratio = power_ratio(own, estimate_structure_power(structure));
        if worth_the_fight(group, ratio, &w, ctx, rng) {
            return attack_structure(group, ctx);
        }
    }

    if w.monster_aggression {
        return attack_monsters(group, ctx, rng);
    }
    Outcome::Declined(DeclineReason::NoSuitableTarget)
}

/// Work on the structure standing on the group's tile, if any.
fn structure_work(group: &Group, ctx: &DecisionContext<'_>, rng: &mut dyn RandomSource) -> Outcome {
    let Some(structure) = ctx.chunks.structure_at(group.coord()) else {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    };
    if structure.is_building() {
        return adopt_structure(group, structure, ctx, rng);
    }
    if !structure.monster || structure.in_battle() {
        return Outcome::Declined(DeclineReason::NotMonsterStructure);
    }
    if !group.items.is_empty() && is_home(group, structure) {
        return demobilize(group, structure, ctx);
    }

    let chance = ctx.config.upgrade_chance * ctx.weights_for(group).build;
    if !rng.chance(chance) {
        return Outcome::Declined(DeclineReason::RandomRejection);
    }
    upgrade_structure(group, structure, ctx)
        .or_else(|| add_building(group, structure, ctx, rng))
        .or_else(|| upgrade_any_building(group, structure, ctx))
}

/// Whether the group belongs to `structure`.
fn is_home(group: &Group, structure: &Structure) -> bool {
    let id = Some(structure.id);
    group.home_structure == id
        || group.memory.preferred_structure_id == id
        || group.memory.mobilized_from_structure == id
        || structure.owner_group() == Some(group.id)
}

fn idle_found(group: &Group, ctx: &DecisionContext<'_>, rng: &mut dyn RandomSource) -> Outcome {
    let chance = ctx.config.found_structure_chance * ctx.weights_for(group).build;
    if !rng.chance(chance) {
        return Outcome::Declined(DeclineReason::RandomRejection);
    }
    found_structure(group, ctx, rng)
}

fn idle_gather(group: &Group, ctx: &DecisionContext<'_>, rng: &mut dyn RandomSource) -> Outcome {
    if !is_resource_poor(&group.items, ctx.config.resource_poor_threshold) {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    }
    let chance = ctx.config.idle_gather_chance * ctx.weights_for(group).gather;
    if !rng.chance(chance) {
        return Outcome::Declined(DeclineReason::RandomRejection);
    }
    start_gathering(group, ctx)
}

fn move_or_wander(group: &Group, ctx: &DecisionContext<'_>, rng: &mut dyn RandomSource) -> Outcome {
    match select_target(group, ctx, rng) {
        Some(target) => execute_move(group, &target, ctx, rng),
        None => purposeful_wander(group, ctx, rng),
    }
}
