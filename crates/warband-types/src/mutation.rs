//! Typed world-state mutations and their rendering as realtime-store writes.
//!
//! Every decision returns its own list of [`Mutation`]s. The tick driver
//! merges them into one [`MutationBatch`] that is committed atomically once
//! every group has been evaluated. A sink backed by a path-addressed store
//! renders the batch with [`MutationBatch::to_path_writes`], where a `null`
//! value deletes the path.

use serde::{Deserialize, Serialize};

use crate::coord::TileCoord;
use crate::ids::GroupId;
use crate::structs::{Battle, ChatMessage, Group, Structure};

/// A single world-state change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Mutation {
    /// Write the whole group record at its current tile.
    PutGroup(Box<Group>),
    /// Delete a group from a tile.
    RemoveGroup {
        /// Tile the group is removed from.
        at: TileCoord,
        /// The removed group.
        group_id: GroupId,
    },
    /// Write the whole structure record at its tile.
    PutStructure(Box<Structure>),
    /// Write the whole battle record at its tile.
    PutBattle(Box<Battle>),
    /// Append a chat/event line.
    Chat(ChatMessage),
}

impl Mutation {
    /// Whole-record group write.
    pub fn put_group(group: Group) -> Self {
        Self::PutGroup(Box::new(group))
    }

    /// Whole-record structure write.
    pub fn put_structure(structure: Structure) -> Self {
        Self::PutStructure(Box::new(structure))
    }

    /// Whole-record battle write.
    pub fn put_battle(battle: Battle) -> Self {
        Self::PutBattle(Box::new(battle))
    }

    /// Tile this mutation targets, if it is tile-scoped.
    pub const fn tile(&self) -> Option<TileCoord> {
        match self {
            Self::PutGroup(g) => Some(g.coord()),
            Self::RemoveGroup { at, .. } => Some(*at),
            Self::PutStructure(s) => Some(s.coord()),
            Self::PutBattle(b) => Some(b.coord()),
            Self::Chat(_) => None,
        }
    }
}

/// A single `path -> value` write. A `null` value deletes the path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathWrite {
    /// Slash-separated store path.
    pub path: String,
    /// JSON value to write.
    pub value: serde_json::Value,
}

/// An ordered batch of mutations, committed as one atomic update.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MutationBatch {
    mutations: Vec<Mutation>,
}

impl MutationBatch {
    /// An empty batch.
    pub const fn new() -> Self {
        Self {
            mutations: Vec::new(),
        }
    }

    /// Append one mutation.
    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    /// Append many mutations, preserving their order.
    pub fn extend(&mut self, mutations: impl IntoIterator<Item = Mutation>) {
        self.mutations.extend(mutations);
    }

    /// Iterate the mutations in order.
    pub fn iter(&self) -> impl Iterator<Item = &Mutation> {
        self.mutations.iter()
    }

    /// Number of mutations.
    pub fn len(&self) -> usize {
        self.mutations.len()
    }

    /// Whether the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }

    /// Consume the batch, yielding its mutations.
    pub fn into_inner(self) -> Vec<Mutation> {
        self.mutations
    }

    /// Render every mutation as a store write under `worlds/{world_id}`.
    ///
    /// Later writes to the same path win when applied in order.
    pub fn to_path_writes(&self, world_id: &str) -> Result<Vec<PathWrite>, serde_json::Error> {
        let mut writes = Vec::with_capacity(self.mutations.len());
        for mutation in &self.mutations {
            let write = match mutation {
                Mutation::PutGroup(group) => PathWrite {
                    path: format!("{}/groups/{}", tile_path(world_id, group.coord()), group.id),
                    value: serde_json::to_value(group)?,
                },
                Mutation::RemoveGroup { at, group_id } => PathWrite {
                    path: format!("{}/groups/{group_id}", tile_path(world_id, *at)),
                    value: serde_json::Value::Null,
                },
                Mutation::PutStructure(structure) => PathWrite {
                    path: format!("{}/structure", tile_path(world_id, structure.coord())),
                    value: serde_json::to_value(structure)?,
                },
                Mutation::PutBattle(battle) => PathWrite {
                    path: format!("{}/battles/{}", tile_path(world_id, battle.coord()), battle.id),
                    value: serde_json::to_value(battle)?,
                },
                Mutation::Chat(message) => PathWrite {
                    path: format!("worlds/{world_id}/chat/{}", message.id),
                    value: serde_json::to_value(message)?,
                },
            };
            writes.push(write);
        }
        Ok(writes)
    }
}

impl IntoIterator for MutationBatch {
    type Item = Mutation;
    type IntoIter = std::vec::IntoIter<Mutation>;

    fn into_iter(self) -> Self::IntoIter {
        self.mutations.into_iter()
    }
}

impl FromIterator<Mutation> for MutationBatch {
    fn from_iter<I: IntoIterator<Item = Mutation>>(iter: I) -> Self {
        Self {
            mutations: iter.into_iter().collect(),
        }
    }
}

fn tile_path(world_id: &str, at: TileCoord) -> String {
    format!("worlds/{world_id}/chunks/{}/{}", at.chunk_key(), at.tile_key())
}
