//! Decision results.
//!
//! Every decision function returns an [`Outcome`]: either the group
//! [`Acted`](Outcome::Acted), carrying the mutations that implement the
//! action, or it [`Declined`](Outcome::Declined) with a reason code from a
//! fixed vocabulary. Callers branch on the variant, never on errors.

use serde::Serialize;

use warband_types::{BattleId, Mutation, StructureId, TargetKind, TileCoord};

/// What a group did this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Started a multi-step move toward a target.
    Move,
    /// Took a single step onto a neighbouring tile.
    Hop,
    /// Started an exploratory move.
    Wander,
    /// Advanced one waypoint along the current path.
    Advance,
    /// Reached the end of the current path.
    Arrive,
    /// Absorbed same-race groups on the tile.
    Merge,
    /// Started a battle against player groups.
    AttackPlayers,
    /// Started a battle against other monster groups.
    AttackMonsters,
    /// Started a battle against a structure.
    AttackStructure,
    /// Joined an existing battle.
    JoinBattle,
    /// Started constructing a new structure.
    FoundStructure,
    /// Raised a structure's level.
    UpgradeStructure,
    /// Added an inner building.
    AddBuilding,
    /// Raised an inner building's level.
    UpgradeBuilding,
    /// Deposited carried items at a structure.
    Demobilise,
    /// Took over an unfinished structure.
    Adopt,
    /// Started gathering on the current tile.
    Gather,
}

impl ActionKind {
    /// Snake-case label used in logs and summaries.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Move => "move",
            Self::Hop => "hop",
            Self::Wander => "wander",
            Self::Advance => "advance",
            Self::Arrive => "arrive",
            Self::Merge => "merge",
            Self::AttackPlayers => "attack_players",
            Self::AttackMonsters => "attack_monsters",
            Self::AttackStructure => "attack_structure",
            Self::JoinBattle => "join_battle",
            Self::FoundStructure => "found_structure",
            Self::UpgradeStructure => "upgrade_structure",
            Self::AddBuilding => "add_building",
            Self::UpgradeBuilding => "upgrade_building",
            Self::Demobilise => "demobilise",
            Self::Adopt => "adopt",
            Self::Gather => "gather",
        }
    }
}

impl core::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a group did not act.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclineReason {
    /// Too few units to found a structure.
    NotEnoughUnits,
    /// No valid build site.
    UnsuitableLocation,
    /// Cannot afford any candidate.
    InsufficientResources,
    /// The requested structure kind cannot be built by monsters.
    InvalidStructureType,
    /// The payment failed after the affordability check.
    ResourceConsumptionFailed,
    /// Already at the maximum level.
    MaxLevelReached,
    /// Nothing worth doing was found.
    NoSuitableTarget,
    /// Every neighbouring tile is impassable.
    BlockedByTerrain,
    /// A land group's way is blocked by water.
    BlockedByWater,
    /// A land group stands with water on every side.
    SurroundedByWater,
    /// The structure is not monster-owned.
    NotMonsterStructure,
    /// The structure is already complete.
    StructureNotBuilding,
    /// Another group is still building it.
    HasActiveBuilder,
    /// A player structure that is neither flagged nor abandoned.
    NotMonsterFriendly,
    /// The dice said no.
    RandomRejection,
    /// Nothing to deposit.
    NoItemsToDeposit,
    /// Gathering, building, fighting or demobilising.
    Busy,
    /// Waiting for the next waypoint.
    StillMoving,
    /// Touched a group, structure or battle another group already claimed
    /// this tick.
    TileClaimed,
    /// Not a monster group or no component applied.
    NoAction,
}

impl DeclineReason {
    /// Snake-case reason code.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotEnoughUnits => "not_enough_units",
            Self::UnsuitableLocation => "unsuitable_location",
            Self::InsufficientResources => "insufficient_resources",
            Self::InvalidStructureType => "invalid_structure_type",
            Self::ResourceConsumptionFailed => "resource_consumption_failed",
            Self::MaxLevelReached => "max_level_reached",
            Self::NoSuitableTarget => "no_suitable_target",
            Self::BlockedByTerrain => "blocked_by_terrain",
            Self::BlockedByWater => "blocked_by_water",
            Self::SurroundedByWater => "surrounded_by_water",
            Self::NotMonsterStructure => "not_monster_structure",
            Self::StructureNotBuilding => "structure_not_building",
            Self::HasActiveBuilder => "has_active_builder",
            Self::NotMonsterFriendly => "not_monster_friendly",
            Self::RandomRejection => "random_rejection",
            Self::NoItemsToDeposit => "no_items_to_deposit",
            Self::Busy => "busy",
            Self::StillMoving => "still_moving",
            Self::TileClaimed => "tile_claimed",
            Self::NoAction => "no_action",
        }
    }
}

impl core::fmt::Display for DeclineReason {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A performed action with the mutations that implement it.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    /// What was done.
    pub kind: ActionKind,
    /// World changes, in application order.
    pub mutations: Vec<Mutation>,
    /// Destination or subject tile.
    pub target: Option<TileCoord>,
    /// Semantic type of the destination, for moves.
    pub target_kind: Option<TargetKind>,
    /// Structure acted on.
    pub structure_id: Option<StructureId>,
    /// Battle created or joined.
    pub battle_id: Option<BattleId>,
}

impl Action {
    /// An action with no mutations or references yet.
    pub const fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            mutations: Vec::new(),
            target: None,
            target_kind: None,
            structure_id: None,
            battle_id: None,
        }
    }

    /// Append a mutation.
    #[must_use]
    pub fn with(mut self, mutation: Mutation) -> Self {
        self.mutations.push(mutation);
        self
    }

    /// Set the destination tile and its kind.
    #[must_use]
    pub const fn toward(mut self, target: TileCoord, kind: Option<TargetKind>) -> Self {
        self.target = Some(target);
        self.target_kind = kind;
        self
    }

    /// Reference a structure.
    #[must_use]
    pub const fn on_structure(mut self, id: StructureId) -> Self {
        self.structure_id = Some(id);
        self
    }

    /// Reference a battle.
    #[must_use]
    pub const fn in_battle(mut self, id: BattleId) -> Self {
        self.battle_id = Some(id);
        self
    }
}

/// Result of a decision.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The group acted.
    Acted(Action),
    /// The group did not act.
    Declined(DeclineReason),
}

impl Outcome {
    /// Whether the group acted.
    pub const fn is_acted(&self) -> bool {
        matches!(self, Self::Acted(_))
    }

    /// The action, if any.
    pub const fn action(&self) -> Option<&Action> {
        match self {
            Self::Acted(action) => Some(action),
            Self::Declined(_) => None,
        }
    }

    /// The decline reason, if any.
    pub const fn reason(&self) -> Option<DeclineReason> {
        match self {
            Self::Acted(_) => None,
            Self::Declined(reason) => Some(*reason),
        }
    }

    /// Action kind, if any.
    pub fn kind(&self) -> Option<ActionKind> {
        self.action().map(|a| a.kind)
    }

    /// Mutations of the action (empty when declined).
    pub fn mutations(&self) -> &[Mutation] {
        match self {
            Self::Acted(action) => &action.mutations,
            Self::Declined(_) => &[],
        }
    }

    /// Consume the outcome, yielding its mutations.
    pub fn into_mutations(self) -> Vec<Mutation> {
        match self {
            Self::Acted(action) => action.mutations,
            Self::Declined(_) => Vec::new(),
        }
    }

    /// `self` if acted, otherwise the result of `next`.
    #[must_use]
    pub fn or_else(self, next: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Acted(_) => self,
            Self::Declined(_) => next(),
        }
    }
}
