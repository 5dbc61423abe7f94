//! The per-tick world scan: a bounded, read-only view of points of interest
//! around a group, supplied by the snapshot provider.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::coord::TileCoord;
use crate::enums::StructureKind;
use crate::ids::{GroupId, StructureId};
use crate::inventory::ItemCode;

/// Light metadata describing a scanned structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct StructureSummary {
    /// Structure id.
    pub id: StructureId,
    /// Structure kind.
    pub kind: StructureKind,
    /// Current level. Zero when the provider does not report one.
    #[serde(default)]
    pub level: u32,
    /// Defence power estimate supplied by the provider, if any.
    #[serde(default)]
    pub defense_power: Option<f64>,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Owner display name.
    #[serde(default)]
    pub owner: String,
    /// Whether the structure is monster-affiliated.
    #[serde(default)]
    pub monster: bool,
}

/// A scanned structure with its location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScannedStructure {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Structure metadata.
    pub structure: StructureSummary,
}

impl ScannedStructure {
    /// Tile the structure stands on.
    pub const fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }
}

/// A tile rich in a particular resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ResourceHotspot {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Resource found there.
    pub resource: ItemCode,
    /// Amount available.
    pub amount: u32,
}

impl ResourceHotspot {
    /// Tile of the hotspot.
    pub const fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }
}

/// Another monster group seen by the scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScannedGroup {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
    /// Group id.
    pub id: GroupId,
    /// Race tag.
    pub race: String,
    /// Number of units.
    pub unit_count: u32,
    /// Estimated power.
    pub power: f64,
}

impl ScannedGroup {
    /// Tile the group stands on.
    pub const fn coord(&self) -> TileCoord {
        TileCoord::new(self.x, self.y)
    }
}

/// Points of interest near a group, valid for one tick.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldScan {
    /// Monster-owned structures.
    #[serde(default)]
    pub monster_structures: Vec<ScannedStructure>,
    /// Player spawn points.
    #[serde(default)]
    pub player_spawns: Vec<ScannedStructure>,
    /// Player structures other than spawns.
    #[serde(default)]
    pub player_structures: Vec<ScannedStructure>,
    /// Resource-rich tiles.
    #[serde(default)]
    pub resource_hotspots: Vec<ResourceHotspot>,
    /// Other monster groups.
    #[serde(default)]
    pub monster_groups: Vec<ScannedGroup>,
}

impl WorldScan {
    /// Locate a structure by id across every structure list.
    pub fn find_structure(&self, id: StructureId) -> Option<&ScannedStructure> {
        self.monster_structures
            .iter()
            .chain(&self.player_spawns)
            .chain(&self.player_structures)
            .find(|s| s.structure.id == id)
    }

    /// Whether the scan holds nothing at all.
    pub fn is_empty(&self) -> bool {
        self.monster_structures.is_empty()
            && self.player_spawns.is_empty()
            && self.player_structures.is_empty()
            && self.resource_hotspots.is_empty()
            && self.monster_groups.is_empty()
    }
}
