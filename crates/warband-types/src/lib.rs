//! Shared type definitions for the Warband monster engine.
//!
//! This crate is the single source of truth for the persisted world model:
//! groups, structures, battles and tile data, plus the per-tick world scan
//! and the typed mutation batch every decision produces. Client-facing
//! types flow to `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`coord`] -- Tile coordinates, chunk keys, compass directions
//! - [`enums`] -- Personality archetypes, structure kinds, battle roles
//! - [`inventory`] -- Canonical item-code inventory with legacy read shim
//! - [`structs`] -- Groups, structures, battles, tiles, chat messages
//! - [`scan`] -- The read-only world scan
//! - [`mutation`] -- Typed mutations and path/value rendering

pub mod coord;
pub mod enums;
pub mod ids;
pub mod inventory;
pub mod mutation;
pub mod scan;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use coord::{CHUNK_SIZE, Direction, TileCoord};
pub use enums::{
    BattleRole, BattleSide, BattleTargetKind, BuildingKind, Motion, ParticipantKind, Personality,
    StructureFeature, StructureKind, TargetKind,
};
pub use ids::{BattleId, BuildingId, GroupId, MessageId, PlayerId, StructureId, UnitId};
pub use inventory::{Inventory, ItemCode};
pub use mutation::{Mutation, MutationBatch, PathWrite};
pub use scan::{ResourceHotspot, ScannedGroup, ScannedStructure, StructureSummary, WorldScan};
pub use structs::{
    AiMemory, Battle, BattleLink, BattleSideState, BuildStatus, BuildingState, ChatMessage, Chunk,
    DemobiliseState, GatheringState, Group, GroupActivity, GroupOwner, InnerBuilding,
    MovementState, Participant, ResourceDeposit, Structure, StructureDefense, StructureOwner,
    TileData, Unit,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for client-facing types.

    #[test]
    fn export_bindings() {
        // Calling export_all writes the bindings into `bindings/` relative
        // to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::GroupId::export_all();
        let _ = crate::ids::PlayerId::export_all();
        let _ = crate::ids::StructureId::export_all();
        let _ = crate::ids::BuildingId::export_all();
        let _ = crate::ids::BattleId::export_all();
        let _ = crate::ids::UnitId::export_all();
        let _ = crate::ids::MessageId::export_all();

        // Coordinates and enums
        let _ = crate::coord::TileCoord::export_all();
        let _ = crate::coord::Direction::export_all();
        let _ = crate::enums::Personality::export_all();
        let _ = crate::enums::Motion::export_all();
        let _ = crate::enums::StructureKind::export_all();
        let _ = crate::enums::BuildingKind::export_all();
        let _ = crate::enums::StructureFeature::export_all();
        let _ = crate::enums::BattleRole::export_all();
        let _ = crate::enums::BattleTargetKind::export_all();
        let _ = crate::enums::ParticipantKind::export_all();
        let _ = crate::enums::TargetKind::export_all();
        let _ = crate::inventory::ItemCode::export_all();

        // Structs
        let _ = crate::structs::Unit::export_all();
        let _ = crate::structs::Group::export_all();
        let _ = crate::structs::GroupActivity::export_all();
        let _ = crate::structs::Structure::export_all();
        let _ = crate::structs::Battle::export_all();
        let _ = crate::structs::TileData::export_all();
        let _ = crate::structs::ChatMessage::export_all();

        // Scan
        let _ = crate::scan::WorldScan::export_all();
    }
}
