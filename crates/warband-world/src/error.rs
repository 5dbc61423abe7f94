//! Error types for the `warband-world` crate.
//!
//! These are genuine faults of the external collaborators (store, scan
//! provider). Expected "cannot act" outcomes are never errors.

use warband_types::TileCoord;

/// Errors raised while reading world data.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// A chunk could not be loaded from the store.
    #[error("chunk {key} unavailable: {reason}")]
    ChunkUnavailable {
        /// The chunk key (`"cx,cy"`).
        key: String,
        /// Why the load failed.
        reason: String,
    },

    /// The world scan provider failed.
    #[error("world scan for {world_id} around {center} unavailable: {reason}")]
    ScanUnavailable {
        /// World being scanned.
        world_id: String,
        /// Scan centre.
        center: TileCoord,
        /// Why the scan failed.
        reason: String,
    },

    /// Stored tile data could not be interpreted.
    #[error("malformed tile data at {key}: {reason}")]
    MalformedTile {
        /// The tile key (`"x,y"`).
        key: String,
        /// What was wrong with it.
        reason: String,
    },
}
