//! Per-tick claim ledger.
//!
//! Decisions run against one snapshot, so two groups can pick actions that
//! touch the same record. The driver claims every group, structure tile
//! and battle an accepted outcome writes; a later outcome touching any
//! claimed key is rejected whole and the group retries next tick.
//!
//! The snapshot also misses structures founded earlier in the same tick.
//! [`FoundedSites`] keeps those so density limits can be re-checked
//! before a later founding is accepted.

use std::collections::BTreeSet;

use warband_types::{BattleId, GroupId, Mutation, TileCoord};
use warband_world::ChunkCache;

/// A record an outcome writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ClaimKey {
    /// A group record.
    Group(GroupId),
    /// The structure slot of a tile.
    StructureTile(TileCoord),
    /// A battle record.
    Battle(BattleId),
}

impl core::fmt::Display for ClaimKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Group(id) => write!(f, "group {id}"),
            Self::StructureTile(at) => write!(f, "structure at {at}"),
            Self::Battle(id) => write!(f, "battle {id}"),
        }
    }
}

/// Keys written by `mutations`. Chat lines claim nothing.
pub fn keys_of(mutations: &[Mutation]) -> BTreeSet<ClaimKey> {
    mutations
        .iter()
        .filter_map(|m| match m {
            Mutation::PutGroup(g) => Some(ClaimKey::Group(g.id)),
            Mutation::RemoveGroup { group_id, .. } => Some(ClaimKey::Group(*group_id)),
            Mutation::PutStructure(s) => Some(ClaimKey::StructureTile(s.coord())),
            Mutation::PutBattle(b) => Some(ClaimKey::Battle(b.id)),
            Mutation::Chat(_) => None,
        })
        .collect()
}

/// Keys claimed so far this tick.
#[derive(Debug, Clone, Default)]
pub struct ClaimLedger {
    claimed: BTreeSet<ClaimKey>,
}

impl ClaimLedger {
    /// An empty ledger.
    pub const fn new() -> Self {
        Self {
            claimed: BTreeSet::new(),
        }
    }

    /// Claim every key of `mutations`, or none of them.
    ///
    /// Returns the first key that was already claimed on conflict.
    pub fn try_claim(&mut self, mutations: &[Mutation]) -> Result<(), ClaimKey> {
        let keys = keys_of(mutations);
        if let Some(taken) = keys.iter().find(|k| self.claimed.contains(k)) {
            return Err(*taken);
        }
        self.claimed.extend(keys);
        Ok(())
    }

    /// Number of claimed keys.
    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    /// Whether nothing was claimed yet.
    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// Monster structures founded by outcomes accepted earlier this tick.
#[derive(Debug, Clone, Default)]
pub struct FoundedSites {
    sites: BTreeSet<TileCoord>,
}

impl FoundedSites {
    /// No foundings yet.
    pub const fn new() -> Self {
        Self {
            sites: BTreeSet::new(),
        }
    }

    /// Tiles where `mutations` put a monster structure onto a slot that
    /// is empty in `cache`.
    pub fn new_sites(mutations: &[Mutation], cache: &ChunkCache) -> Vec<TileCoord> {
        mutations
            .iter()
            .filter_map(|m| match m {
                Mutation::PutStructure(s) if s.monster => Some(s.coord()),
                _ => None,
            })
            .filter(|at| cache.structure_at(*at).is_none())
            .collect()
    }

    /// Remember accepted foundings.
    pub fn record(&mut self, sites: impl IntoIterator<Item = TileCoord>) {
        self.sites.extend(sites);
    }

    /// Foundings within euclidean `radius` of `center`.
    pub fn count_within(&self, center: TileCoord, radius: f64) -> usize {
        self.sites
            .iter()
            .filter(|at| center.distance(**at) <= radius)
            .count()
    }

    /// Whether nothing was founded yet.
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
