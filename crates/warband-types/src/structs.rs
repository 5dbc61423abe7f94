//! Core entity structs: groups, structures, battles, and tile data.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::coord::{Direction, TileCoord};
use crate::enums::{
    BattleRole, BattleSide, BattleTargetKind, BuildingKind, Motion, ParticipantKind, Personality,
    StructureFeature, StructureKind, TargetKind,
};
use crate::ids::{BattleId, BuildingId, GroupId, MessageId, PlayerId, StructureId, UnitId};
use crate::inventory::{Inventory, ItemCode};

// ---------------------------------------------------------------------------
// Units
// ---------------------------------------------------------------------------

/// Stats of a single unit. Units are counted and summed, never simulated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Unit {
    /// Unit type tag, e.g. `goblin_spearman`.
    pub kind: String,
    /// Relative combat strength (1.0 is an average unit).
    #[serde(default = "default_strength")]
    pub strength: f64,
    /// Current health.
    #[serde(default = "default_health")]
    pub health: u32,
    /// Maximum health.
    #[serde(default = "default_health")]
    pub max_health: u32,
}

const fn default_strength() -> f64 {
    1.0
}

const fn default_health() -> u32 {
    100
}

impl Unit {
    /// A full-health unit of the given kind and strength.
    pub fn new(kind: &str, strength: f64) -> Self {
        Self {
            kind: String::from(kind),
            strength,
            health: default_health(),
            max_health: default_health(),
        }
    }

    /// Current health as a fraction of maximum, in `[0, 1]`.
    pub fn health_fraction(&self) -> f64 {
        if self.max_health == 0 {
            return 0.0;
        }
        (f64::from(self.health) / f64::from(self.max_health)).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// Who controls a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GroupOwner {
    /// A monster faction (identified by the group's race).
    Monster,
    /// A player.
    Player {
        /// Owning player.
        player_id: PlayerId,
    },
}

/// Movement sub-state, present only while a group is moving.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MovementState {
    /// Ordered waypoints, starting with the tile the move began on.
    pub path: Vec<TileCoord>,
    /// Index of the waypoint the group currently stands on.
    pub path_index: u32,
    /// When the move was issued.
    pub move_started: DateTime<Utc>,
    /// Speed multiplier applied to the per-step duration.
    pub move_speed: f64,
    /// Declared destination column.
    pub target_x: i32,
    /// Declared destination row.
    pub target_y: i32,
    /// Semantic type of the destination.
    pub target_kind: TargetKind,
    /// Earliest time the next waypoint may be entered.
    pub next_move_time: DateTime<Utc>,
}

impl MovementState {
    /// The declared destination.
    pub const fn target(&self) -> TileCoord {
        TileCoord::new(self.target_x, self.target_y)
    }
}

/// Gathering sub-state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GatheringState {
    /// Biome being gathered from.
    pub gathering_biome: String,
    /// When gathering started.
    pub gathering_started: DateTime<Utc>,
}

/// Building sub-state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BuildingState {
    /// The structure under construction.
    pub structure_id: StructureId,
    /// Where the structure stands.
    pub site: TileCoord,
    /// When building started.
    pub building_started: DateTime<Utc>,
}

/// Combat sub-state: the group's half of the battle linkage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BattleLink {
    /// The battle the group is fighting in.
    pub battle_id: BattleId,
    /// Side the group fights on.
    #[ts(type = "1 | 2")]
    pub battle_side: BattleSide,
    /// Role in the battle.
    pub battle_role: BattleRole,
}

/// Demobilisation sub-state: depositing loot at a structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DemobiliseState {
    /// Structure receiving the deposit.
    pub target_structure: StructureId,
    /// When demobilisation started.
    pub demobilise_start: DateTime<Utc>,
}

/// What a group is currently doing. Exactly one at a time; the sub-state
/// lives inside the variant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GroupActivity {
    /// Waiting for a decision.
    #[default]
    Idle,
    /// Following a path.
    Moving(MovementState),
    /// Collecting resources on the current tile.
    Gathering(GatheringState),
    /// Constructing a structure.
    Building(BuildingState),
    /// Engaged in a battle.
    Fighting(BattleLink),
    /// Depositing items at a structure.
    Demobilising(DemobiliseState),
}

impl GroupActivity {
    /// Lowercase status label as persisted.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Moving(_) => "moving",
            Self::Gathering(_) => "gathering",
            Self::Building(_) => "building",
            Self::Fighting(_) => "fighting",
            Self::Demobilising(_) => "demobilising",
        }
    }
}

/// Decision memory carried between ticks by a monster group.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AiMemory {
    /// Remaining ticks of the post-mobilisation exploration phase.
    #[serde(default)]
    pub exploration_ticks: u32,
    /// Structure the group was mobilised from.
    #[serde(default)]
    pub mobilized_from_structure: Option<StructureId>,
    /// The group's preferred (home) structure.
    #[serde(default)]
    pub preferred_structure_id: Option<StructureId>,
    /// An explicit raid order set from outside the engine.
    #[serde(default)]
    pub target_structure: Option<StructureId>,
    /// Persistent heading used by purposeful wandering.
    #[serde(default)]
    pub preferred_direction: Option<Direction>,
}

impl AiMemory {
    /// Whether the exploration phase is active.
    pub const fn is_exploring(&self) -> bool {
        self.exploration_ticks > 0
    }
}

/// A monster or player group standing on a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Group {
    /// Group identifier.
    pub id: GroupId,
    /// Display name.
    pub name: String,
    /// Race/species tag; monster groups of the same race share a faction.
    pub race: String,
    /// Controller.
    pub owner: GroupOwner,
    /// Owning structure, if the group was raised by one.
    #[serde(default)]
    pub home_structure: Option<StructureId>,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Units by id.
    #[serde(default)]
    pub units: BTreeMap<UnitId, Unit>,
    /// Carried items.
    #[serde(default)]
    #[ts(type = "Record<string, number>")]
    pub items: Inventory,
    /// Traversal capabilities; empty means land-only.
    #[serde(default)]
    pub motion: BTreeSet<Motion>,
    /// Current activity.
    #[serde(default)]
    pub activity: GroupActivity,
    /// Archetype (monster groups only).
    #[serde(default)]
    pub personality: Option<Personality>,
    /// Decision memory (monster groups only).
    #[serde(default)]
    pub memory: AiMemory,
}

impl Group {
    /// Tile the group stands on.
    pub const fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    /// Move the group to a tile.
    pub const fn set_coord(&mut self, coord: TileCoord) {
        self.x = coord.x;
        self.y = coord.y;
    }

    /// Number of units, saturating at `u32::MAX`.
    pub fn unit_count(&self) -> u32 {
        u32::try_from(self.units.len()).unwrap_or(u32::MAX)
    }

    /// Whether a monster faction controls the group.
    pub const fn is_monster(&self) -> bool {
        matches!(self.owner, GroupOwner::Monster)
    }

    /// Whether the group is idle.
    pub const fn is_idle(&self) -> bool {
        matches!(self.activity, GroupActivity::Idle)
    }

    /// Movement sub-state if moving.
    pub const fn movement(&self) -> Option<&MovementState> {
        match &self.activity {
            GroupActivity::Moving(m) => Some(m),
            _ => None,
        }
    }

    /// Battle linkage if fighting.
    pub const fn battle_link(&self) -> Option<&BattleLink> {
        match &self.activity {
            GroupActivity::Fighting(link) => Some(link),
            _ => None,
        }
    }

    /// Whether the group is in a battle.
    pub const fn in_battle(&self) -> bool {
        matches!(self.activity, GroupActivity::Fighting(_))
    }

    /// Personality, defaulting to balanced.
    pub fn personality(&self) -> Personality {
        self.personality.unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

/// Who owns a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StructureOwner {
    /// A monster group.
    Monster {
        /// Owning group.
        group_id: GroupId,
    },
    /// A player.
    Player {
        /// Owning player.
        player_id: PlayerId,
    },
}

/// Construction status of a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "status", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BuildStatus {
    /// Under construction.
    Building {
        /// Progress in percent.
        build_progress: u32,
    },
    /// Finished.
    Complete,
}

/// An inner building inside a structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct InnerBuilding {
    /// Building kind.
    pub kind: BuildingKind,
    /// Current level (1-based).
    pub level: u32,
    /// When last built or upgraded.
    #[serde(default)]
    pub upgraded_at: Option<DateTime<Utc>>,
}

/// A structure standing on a tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Structure {
    /// Structure identifier.
    pub id: StructureId,
    /// Structure kind.
    pub kind: StructureKind,
    /// Display name.
    pub name: String,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Owner.
    pub owner: StructureOwner,
    /// Owner display name.
    pub owner_name: String,
    /// Whether the structure is monster-affiliated.
    pub monster: bool,
    /// Level, at least 1.
    #[serde(default = "default_level")]
    pub level: u32,
    /// Construction status.
    pub status: BuildStatus,
    /// Unit capacity.
    #[serde(default)]
    pub capacity: u32,
    /// Stored items.
    #[serde(default)]
    #[ts(type = "Record<string, number>")]
    pub items: Inventory,
    /// Features unlocked by level.
    #[serde(default)]
    pub features: BTreeSet<StructureFeature>,
    /// Inner buildings by id.
    #[serde(default)]
    pub buildings: BTreeMap<BuildingId, InnerBuilding>,
    /// Group currently constructing the structure.
    #[serde(default)]
    pub builder: Option<GroupId>,
    /// Battle the structure is defending in.
    #[serde(default)]
    pub battle_id: Option<BattleId>,
    /// Current health.
    #[serde(default = "default_health")]
    pub health: u32,
    /// Maximum health.
    #[serde(default = "default_health")]
    pub max_health: u32,
    /// Whether a player has flagged the structure as adoptable by monsters.
    #[serde(default)]
    pub monster_friendly: bool,
    /// Last time the owner interacted with the structure.
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
    /// When the structure was last upgraded.
    #[serde(default)]
    pub last_upgraded: Option<DateTime<Utc>>,
}

const fn default_level() -> u32 {
    1
}

impl Structure {
    /// Tile the structure stands on.
    pub const fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    /// Level, treating a missing or zero level as 1.
    pub fn current_level(&self) -> u32 {
        self.level.max(1)
    }

    /// Whether the structure is still under construction.
    pub const fn is_building(&self) -> bool {
        matches!(self.status, BuildStatus::Building { .. })
    }

    /// Whether the structure is defending in a battle.
    pub const fn in_battle(&self) -> bool {
        self.battle_id.is_some()
    }

    /// Owning monster group, if monster-owned.
    pub const fn owner_group(&self) -> Option<GroupId> {
        match self.owner {
            StructureOwner::Monster { group_id } => Some(group_id),
            StructureOwner::Player { .. } => None,
        }
    }

    /// Health as a fraction of maximum, in `[0, 1]`.
    pub fn health_fraction(&self) -> f64 {
        if self.max_health == 0 {
            return 0.0;
        }
        (f64::from(self.health) / f64::from(self.max_health)).clamp(0.0, 1.0)
    }
}

// ---------------------------------------------------------------------------
// Battles
// ---------------------------------------------------------------------------

/// A group's entry in a battle side, with a unit snapshot for damage
/// computation by the external battle resolver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Participant {
    /// Monster or player.
    #[serde(rename = "type")]
    pub kind: ParticipantKind,
    /// Race tag.
    pub race: String,
    /// Unit snapshot at the time of joining.
    pub units: BTreeMap<UnitId, Unit>,
}

/// Structure defence info carried on side 2 when a structure is attacked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StructureDefense {
    /// Defending structure.
    pub structure_id: StructureId,
    /// Estimated defence power.
    pub power: f64,
    /// Owner display name.
    pub owner: String,
}

/// One side of a battle.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BattleSideState {
    /// Side label shown to players.
    pub name: String,
    /// Participating groups.
    #[serde(default)]
    pub groups: BTreeMap<GroupId, Participant>,
    /// Structure defence, side 2 only.
    #[serde(default)]
    pub structure: Option<StructureDefense>,
}

/// A combat session scoped to one tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Battle {
    /// Battle identifier.
    pub id: BattleId,
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// What side 2 consists of.
    pub target_type: BattleTargetKind,
    /// Resolution tick counter, advanced by the external resolver.
    #[serde(default)]
    pub tick_count: u32,
    /// When the battle started.
    pub created_at: DateTime<Utc>,
    /// Initiating side.
    pub side1: BattleSideState,
    /// Defending side.
    pub side2: BattleSideState,
}

impl Battle {
    /// Tile the battle takes place on.
    pub const fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }

    /// The side state for `side`.
    pub const fn side(&self, side: BattleSide) -> &BattleSideState {
        match side {
            BattleSide::One => &self.side1,
            BattleSide::Two => &self.side2,
        }
    }

    /// Mutable side state for `side`.
    pub const fn side_mut(&mut self, side: BattleSide) -> &mut BattleSideState {
        match side {
            BattleSide::One => &mut self.side1,
            BattleSide::Two => &mut self.side2,
        }
    }

    /// Whether `group` participates on either side.
    pub fn involves(&self, group: GroupId) -> bool {
        self.side1.groups.contains_key(&group) || self.side2.groups.contains_key(&group)
    }
}

// ---------------------------------------------------------------------------
// Tiles
// ---------------------------------------------------------------------------

/// A gatherable resource deposit on a tile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceDeposit {
    /// Item produced.
    pub code: ItemCode,
    /// Remaining amount.
    pub amount: u32,
}

/// Everything stored on one tile.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TileData {
    /// Groups on the tile.
    #[serde(default)]
    pub groups: BTreeMap<GroupId, Group>,
    /// The tile's structure, if any.
    #[serde(default)]
    pub structure: Option<Structure>,
    /// Active battles on the tile.
    #[serde(default)]
    pub battles: BTreeMap<BattleId, Battle>,
    /// Gatherable deposits.
    #[serde(default)]
    pub resources: Vec<ResourceDeposit>,
    /// Biome label cached from the terrain generator.
    #[serde(default)]
    pub biome: Option<String>,
}

impl TileData {
    /// Whether any deposit has a positive amount.
    pub fn has_resources(&self) -> bool {
        self.resources.iter().any(|r| r.amount > 0)
    }

    /// Whether some group on the tile is constructing a structure.
    pub fn has_building_group(&self) -> bool {
        self.groups
            .values()
            .any(|g| matches!(g.activity, GroupActivity::Building(_)))
    }
}

/// Tile key (`"x,y"`) to tile data for one chunk.
pub type Chunk = BTreeMap<String, TileData>;

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// A chat/event line announced to players.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// Message identifier.
    pub id: MessageId,
    /// Text shown to players.
    pub text: String,
    /// Column the event happened at.
    pub x: i32,
    /// Row the event happened at.
    pub y: i32,
    /// When the message was emitted.
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    /// A new event message at `at`.
    pub fn event(text: String, at: TileCoord, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: MessageId::new(),
            text,
            x: at.x,
            y: at.y,
            timestamp,
        }
    }
}
