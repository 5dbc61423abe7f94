//! Enumeration types shared by every Warband crate.

use serde::{Deserialize, Deserializer, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Personality archetypes
// ---------------------------------------------------------------------------

/// The behavioural archetype of a monster group.
///
/// The archetype is the only thing persisted; the numeric weight table is
/// derived from it by the decision engine. Serialized ids that are not
/// recognised read back as [`Personality::Balanced`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum Personality {
    /// Seeks fights, tolerates bad odds.
    Aggressive,
    /// Stays close to home and defends it.
    Territorial,
    /// Unpredictable; attacks anything, including other monsters.
    Feral,
    /// Avoids risk, moves slowly.
    Cautious,
    /// Roams far and fast along a preferred heading.
    Nomadic,
    /// Strikes opportunistically, notices targets from further away.
    Sneaky,
    /// Prefers founding and upgrading structures.
    Builder,
    /// Hoards resources.
    Greedy,
    /// No strong preference.
    #[default]
    Balanced,
}

impl Personality {
    /// All archetypes in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Aggressive,
        Self::Territorial,
        Self::Feral,
        Self::Cautious,
        Self::Nomadic,
        Self::Sneaky,
        Self::Builder,
        Self::Greedy,
        Self::Balanced,
    ];

    /// Parse a persisted archetype id (case-insensitive). Unknown ids map
    /// to [`Personality::Balanced`].
    pub fn parse(id: &str) -> Self {
        match id.trim().to_ascii_uppercase().as_str() {
            "AGGRESSIVE" => Self::Aggressive,
            "TERRITORIAL" => Self::Territorial,
            "FERAL" => Self::Feral,
            "CAUTIOUS" => Self::Cautious,
            "NOMADIC" => Self::Nomadic,
            "SNEAKY" => Self::Sneaky,
            "BUILDER" => Self::Builder,
            "GREEDY" => Self::Greedy,
            _ => Self::Balanced,
        }
    }

    /// Canonical persisted id.
    pub const fn id(self) -> &'static str {
        match self {
            Self::Aggressive => "AGGRESSIVE",
            Self::Territorial => "TERRITORIAL",
            Self::Feral => "FERAL",
            Self::Cautious => "CAUTIOUS",
            Self::Nomadic => "NOMADIC",
            Self::Sneaky => "SNEAKY",
            Self::Builder => "BUILDER",
            Self::Greedy => "GREEDY",
            Self::Balanced => "BALANCED",
        }
    }
}

impl<'de> Deserialize<'de> for Personality {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::parse(&raw))
    }
}

// ---------------------------------------------------------------------------
// Mobility
// ---------------------------------------------------------------------------

/// A terrain traversal capability carried in a group's `motion` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Motion {
    /// Walks on dry land.
    Land,
    /// Swims.
    Water,
    /// Flies over anything.
    Flight,
}

// ---------------------------------------------------------------------------
// Structures
// ---------------------------------------------------------------------------

/// The kind of a structure standing on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StructureKind {
    // --- Player structures ---
    /// A player's home spawn point.
    Spawn,
    /// A light player forward base.
    Outpost,
    /// A player lookout tower.
    Watchtower,
    /// A heavily defended player keep.
    Fortress,

    // --- Monster archetypes ---
    /// A cheap monster den.
    MonsterLair,
    /// A monster storage colony.
    MonsterHive,
    /// A monster staging camp for raids.
    MonsterWarcamp,
    /// A fortified monster seat of power.
    MonsterStronghold,
}

impl StructureKind {
    /// Structure kinds a monster group can found.
    pub const MONSTER_BUILDABLE: [Self; 4] = [
        Self::MonsterLair,
        Self::MonsterHive,
        Self::MonsterWarcamp,
        Self::MonsterStronghold,
    ];

    /// Whether this kind is one of the monster archetypes.
    pub const fn is_monster_kind(self) -> bool {
        matches!(
            self,
            Self::MonsterLair | Self::MonsterHive | Self::MonsterWarcamp | Self::MonsterStronghold
        )
    }
}

/// An inner building that can be added to a structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BuildingKind {
    /// Houses and trains units.
    Barracks,
    /// Extra item storage.
    Storehouse,
    /// Weapon smithing.
    Forge,
    /// Ritual site.
    Shrine,
    /// Raised lookout.
    Watchpost,
}

impl BuildingKind {
    /// All inner building kinds.
    pub const ALL: [Self; 5] = [
        Self::Barracks,
        Self::Storehouse,
        Self::Forge,
        Self::Shrine,
        Self::Watchpost,
    ];
}

/// A feature unlocked when a structure reaches a given level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StructureFeature {
    /// Level 2: wooden palisade.
    Palisade,
    /// Level 3: weapon store.
    Armory,
    /// Level 4: rallying banners.
    WarBanners,
    /// Level 5: area of dread around the structure.
    DreadAura,
}

// ---------------------------------------------------------------------------
// Battles
// ---------------------------------------------------------------------------

/// Which side of a battle a participant fights on. Serialized as `1` or `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum BattleSide {
    /// Side 1, the initiator.
    One,
    /// Side 2, the defender.
    Two,
}

impl From<BattleSide> for u8 {
    fn from(side: BattleSide) -> Self {
        match side {
            BattleSide::One => 1,
            BattleSide::Two => 2,
        }
    }
}

impl TryFrom<u8> for BattleSide {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            other => Err(format!("invalid battle side: {other}")),
        }
    }
}

/// The role a participant plays in a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BattleRole {
    /// Started the battle.
    Attacker,
    /// Was attacked.
    Defender,
    /// Joined an existing battle.
    Reinforcement,
}

/// What side 2 of a battle consists of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum BattleTargetKind {
    /// Player groups.
    Group,
    /// A structure and its defences.
    Structure,
    /// Other monster groups.
    MonsterGroup,
}

/// Whether a battle participant is a monster or a player group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ParticipantKind {
    /// Monster faction group.
    Monster,
    /// Player-controlled group.
    Player,
}

// ---------------------------------------------------------------------------
// Movement targets
// ---------------------------------------------------------------------------

/// The semantic type of a movement target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum TargetKind {
    /// A player's spawn point.
    PlayerSpawn,
    /// A tile rich in resources.
    ResourceHotspot,
    /// A monster structure other than home.
    MonsterStructure,
    /// The group's own preferred structure.
    MonsterHome,
    /// A non-spawn player structure.
    PlayerStructure,
    /// Another monster group (potential merge partner).
    MonsterGroup,
    /// An attackable structure on an adjacent tile.
    AdjacentStructure,
    /// An attackable player group on an adjacent tile.
    AdjacentGroup,
    /// A structure named by an external raid order.
    ExplicitOrder,
    /// An interesting landmark found while wandering.
    Landmark,
    /// A heading picked by purposeful wandering.
    Wander,
}

impl TargetKind {
    /// Whether arriving at this kind of target is worth a chat message.
    pub const fn is_significant(self) -> bool {
        matches!(
            self,
            Self::PlayerSpawn | Self::MonsterStructure | Self::MonsterHome | Self::ExplicitOrder
        )
    }

    /// Whether this is an exploratory move.
    pub const fn is_exploratory(self) -> bool {
        matches!(self, Self::Landmark | Self::Wander)
    }
}
