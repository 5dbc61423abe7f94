//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every persisted entity in the world has a strongly-typed ID so that a
//! group id can never be passed where a structure id is expected. New ids
//! use UUID v7 (time-ordered) so that records written in the same tick sort
//! together in the realtime store.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a monster or player group on the grid.
    GroupId
}

define_id! {
    /// Unique identifier for a player account.
    PlayerId
}

define_id! {
    /// Unique identifier for a structure standing on a tile.
    StructureId
}

define_id! {
    /// Unique identifier for an inner building inside a structure.
    BuildingId
}

define_id! {
    /// Unique identifier for a battle session.
    BattleId
}

define_id! {
    /// Unique identifier for a single unit inside a group.
    UnitId
}

define_id! {
    /// Unique identifier for a chat/event message.
    MessageId
}
