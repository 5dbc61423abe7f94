//! Combat initiation and merging.
//!
//! Each function inspects the acting group's own tile and returns the
//! writes that start (or join) a battle. Battle resolution itself is an
//! external concern; we only set up participants, sides and the group
//! linkage so the resolver can pick it up.

use std::collections::BTreeMap;

use tracing::debug;

use warband_types::{
    Battle, BattleId, BattleLink, BattleRole, BattleSide, BattleSideState, BattleTargetKind,
    ChatMessage, Group, GroupActivity, GroupId, GroupOwner, Mutation, Participant,
    ParticipantKind, StructureDefense,
};

use crate::context::DecisionContext;
use crate::outcome::{Action, ActionKind, DeclineReason, Outcome};
use crate::power::estimate_structure_power;
use crate::random::{RandomSource, shuffle};

/// Unit snapshot of a group as a battle participant.
pub fn participant(group: &Group) -> Participant {
    Participant {
        kind: match group.owner {
            GroupOwner::Monster => ParticipantKind::Monster,
            GroupOwner::Player { .. } => ParticipantKind::Player,
        },
        race: group.race.clone(),
        units: group.units.clone(),
    }
}

/// The group's copy with its activity set to fighting.
fn enlisted(group: &Group, battle_id: BattleId, side: BattleSide, role: BattleRole) -> Group {
    let mut g = group.clone();
    g.activity = GroupActivity::Fighting(BattleLink {
        battle_id,
        battle_side: side,
        battle_role: role,
    });
    g
}

fn side_of<'a>(name: &str, groups: impl IntoIterator<Item = &'a Group>) -> BattleSideState {
    BattleSideState {
        name: String::from(name),
        groups: groups
            .into_iter()
            .map(|g| (g.id, participant(g)))
            .collect::<BTreeMap<GroupId, Participant>>(),
        structure: None,
    }
}

// ---------------------------------------------------------------------------
// Merge
// ---------------------------------------------------------------------------

/// Absorb every idle same-race monster group on the tile.
///
/// Units and items are unioned into the acting group, absorbed groups are
/// deleted, and a single chat line reports the merged size.
pub fn merge_groups(group: &Group, ctx: &DecisionContext<'_>) -> Outcome {
    if !group.is_idle() {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    }
    let here = group.coord();
    let kin: Vec<&Group> = ctx
        .chunks
        .groups_at(here)
        .filter(|g| {
            g.id != group.id && g.is_monster() && g.is_idle() && g.race == group.race
        })
        .collect();
    if kin.is_empty() {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    }

    let mut merged = group.clone();
    let mut action = Action::new(ActionKind::Merge).toward(here, None);
    for other in &kin {
        merged
            .units
            .extend(other.units.iter().map(|(id, unit)| (*id, unit.clone())));
        merged.items.absorb(other.items.clone());
        action = action.with(Mutation::RemoveGroup {
            at: here,
            group_id: other.id,
        });
    }

    debug!(
        group_id = %group.id,
        absorbed = kin.len(),
        units = merged.units.len(),
        "Groups merged"
    );
    let text = format!(
        "The {} warbands gather into one horde of {} strong",
        group.race,
        merged.units.len()
    );
    Outcome::Acted(
        action
            .with(Mutation::put_group(merged))
            .with(Mutation::Chat(ChatMessage::event(text, here, ctx.now))),
    )
}

// ---------------------------------------------------------------------------
// Attacks
// ---------------------------------------------------------------------------

/// Attack player groups on the tile, smallest first, up to the configured
/// cap.
pub fn attack_players(group: &Group, ctx: &DecisionContext<'_>) -> Outcome {
    let here = group.coord();
    let mut targets: Vec<&Group> = ctx
        .chunks
        .groups_at(here)
        .filter(|g| !g.is_monster() && !g.in_battle())
        .collect();
    if targets.is_empty() {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    }
    targets.sort_by_key(|g| (g.unit_count(), g.id));
    targets.truncate(ctx.config.max_player_targets.max(1));

    let text = format!("{} falls upon the travellers", group.name);
    let defenders = Side {
        target_type: BattleTargetKind::Group,
        name: "Players",
        groups: &targets,
    };
    Outcome::Acted(start_battle(group, ActionKind::AttackPlayers, &defenders, text, ctx))
}

/// Attack rival monster groups on the tile, chosen uniformly at random up
/// to the configured cap.
pub fn attack_monsters(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    let here = group.coord();
    let mut rivals: Vec<&Group> = ctx
        .chunks
        .groups_at(here)
        .filter(|g| g.is_monster() && g.race != group.race && !g.in_battle())
        .collect();
    if rivals.is_empty() {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    }
    shuffle(rng, &mut rivals);
    rivals.truncate(ctx.config.max_monster_targets.max(1));

    let text = format!("{} turns on rival monsters", group.name);
    let defenders = Side {
        target_type: BattleTargetKind::MonsterGroup,
        name: "Rivals",
        groups: &rivals,
    };
    Outcome::Acted(start_battle(group, ActionKind::AttackMonsters, &defenders, text, ctx))
}

/// Besiege the non-monster structure on the tile.
pub fn attack_structure(group: &Group, ctx: &DecisionContext<'_>) -> Outcome {
    let here = group.coord();
    let Some(structure) = ctx
        .chunks
        .structure_at(here)
        .filter(|s| !s.monster && !s.in_battle())
    else {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    };

    let id = BattleId::new();
    let battle = Battle {
        id,
        x: here.x,
        y: here.y,
        target_type: BattleTargetKind::Structure,
        tick_count: 0,
        created_at: ctx.now,
        side1: side_of(&group.name, [group]),
        side2: BattleSideState {
            name: structure.name.clone(),
            groups: BTreeMap::new(),
            structure: Some(StructureDefense {
                structure_id: structure.id,
                power: estimate_structure_power(structure),
                owner: structure.owner_name.clone(),
            }),
        },
    };

    let mut besieged = structure.clone();
    besieged.battle_id = Some(id);

    debug!(group_id = %group.id, structure_id = %structure.id, battle_id = %id, "Siege started");
    let text = format!("{} lays siege to {}", group.name, structure.name);
    Outcome::Acted(
        Action::new(ActionKind::AttackStructure)
            .toward(here, None)
            .on_structure(structure.id)
            .in_battle(id)
            .with(Mutation::put_battle(battle))
            .with(Mutation::put_structure(besieged))
            .with(Mutation::put_group(enlisted(
                group,
                id,
                BattleSide::One,
                BattleRole::Attacker,
            )))
            .with(Mutation::Chat(ChatMessage::event(text, here, ctx.now))),
    )
}

/// Join a random battle on the tile that the group is not already part
/// of, as attacker with the configured chance and otherwise as defender.
pub fn join_battle(
    group: &Group,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    let battles: Vec<_> = ctx
        .chunks
        .battles_at(group.coord())
        .filter(|b| !b.involves(group.id))
        .collect();
    let Some(battle) = crate::random::pick(rng, &battles).copied() else {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    };
    join_specific_battle(group, battle, ctx, rng)
}

/// Join `battle` on a side chosen by the join-attacker roll.
pub fn join_specific_battle(
    group: &Group,
    battle: &Battle,
    ctx: &DecisionContext<'_>,
    rng: &mut dyn RandomSource,
) -> Outcome {
    if battle.involves(group.id) {
        return Outcome::Declined(DeclineReason::NoSuitableTarget);
    }
    let side = if rng.chance(ctx.config.join_attacker_chance) {
        BattleSide::One
    } else {
        BattleSide::Two
    };

    let mut updated = battle.clone();
    updated
        .side_mut(side)
        .groups
        .insert(group.id, participant(group));

    debug!(group_id = %group.id, battle_id = %battle.id, side = ?side, "Joined battle");
    let text = format!("{} joins the fray", group.name);
    Outcome::Acted(
        Action::new(ActionKind::JoinBattle)
            .toward(battle.coord(), None)
            .in_battle(battle.id)
            .with(Mutation::put_battle(updated))
            .with(Mutation::put_group(enlisted(
                group,
                battle.id,
                side,
                BattleRole::Reinforcement,
            )))
            .with(Mutation::Chat(ChatMessage::event(
                text,
                battle.coord(),
                ctx.now,
            ))),
    )
}

/// Defending side of a group-versus-group battle.
struct Side<'a> {
    target_type: BattleTargetKind,
    name: &'a str,
    groups: &'a [&'a Group],
}

/// Shared setup for group-versus-group battles. Callers guarantee at least
/// one defender.
fn start_battle(
    group: &Group,
    kind: ActionKind,
    defenders: &Side<'_>,
    text: String,
    ctx: &DecisionContext<'_>,
) -> Action {
    let here = group.coord();
    let id = BattleId::new();
    let battle = Battle {
        id,
        x: here.x,
        y: here.y,
        target_type: defenders.target_type,
        tick_count: 0,
        created_at: ctx.now,
        side1: side_of(&group.name, [group]),
        side2: side_of(defenders.name, defenders.groups.iter().copied()),
    };

    debug!(
        group_id = %group.id,
        battle_id = %id,
        defenders = defenders.groups.len(),
        target = ?defenders.target_type,
        "Battle started"
    );
    let mut action = Action::new(kind)
        .toward(here, None)
        .in_battle(id)
        .with(Mutation::put_battle(battle))
        .with(Mutation::put_group(enlisted(
            group,
            id,
            BattleSide::One,
            BattleRole::Attacker,
        )));
    for defender in defenders.groups {
        action = action.with(Mutation::put_group(enlisted(
            defender,
            id,
            BattleSide::Two,
            BattleRole::Defender,
        )));
    }
    action.with(Mutation::Chat(ChatMessage::event(text, here, ctx.now)))
}
