//! Tick driver: one decision per monster group, one atomic commit.
//!
//! Each tick runs through three phases:
//!
//! 1. **Read** -- list the monster groups, then for each group load the
//!    chunks around it into the tick's [`ChunkCache`] and fetch its world
//!    scan. Nothing is read after this point for that group.
//!
//! 2. **Decide** -- run [`decide`] against the immutable snapshot. An
//!    acted outcome is accepted only if none of the records it writes was
//!    already claimed by an earlier group this tick, and if a new monster
//!    structure it founds stays under the density cap once the structures
//!    founded earlier this tick are counted. Otherwise it is dropped whole
//!    and counted as `tile_claimed`.
//!
//! 3. **Commit** -- merge every accepted mutation list, in group order,
//!    into one [`MutationBatch`] and hand it to the [`MutationSink`].
//!
//! A failing read for one group (unloadable chunk, scan provider error)
//! is logged and counted; the remaining groups still run. Only a roster
//! failure or a rejected commit fails the tick.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use warband_ai::{ActionKind, DecisionContext, DeclineReason, Outcome, RandomSource, decide};
use warband_types::{MutationBatch, TileCoord};
use warband_world::{
    ChunkCache, ChunkStore, GroupLocation, MonsterRoster, TerrainOracle, WorldError,
    WorldScanProvider,
};

use crate::claims::{ClaimLedger, FoundedSites};
use crate::config::SimulationConfig;
use crate::sink::{CommitError, MutationSink};

/// Errors that fail a whole tick.
#[derive(Debug, thiserror::Error)]
pub enum TickError {
    /// The monster roster could not be read.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },

    /// The merged batch could not be committed.
    #[error("commit error: {source}")]
    Commit {
        /// The underlying commit error.
        #[from]
        source: CommitError,
    },
}

/// The external collaborators a tick reads from.
#[derive(Clone, Copy)]
pub struct TickInputs<'a> {
    /// Lists the groups to evaluate.
    pub roster: &'a dyn MonsterRoster,
    /// Serves chunk data.
    pub store: &'a dyn ChunkStore,
    /// Serves per-group scans.
    pub scans: &'a dyn WorldScanProvider,
    /// The terrain generator.
    pub terrain: &'a dyn TerrainOracle,
}

impl<'a> TickInputs<'a> {
    /// Inputs backed by one world implementing every read contract.
    pub fn from_world<W>(world: &'a W, terrain: &'a dyn TerrainOracle) -> Self
    where
        W: MonsterRoster + ChunkStore + WorldScanProvider,
    {
        Self {
            roster: world,
            store: world,
            scans: world,
            terrain,
        }
    }
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// Timestamp every decision saw.
    pub timestamp: DateTime<Utc>,
    /// Groups that reached the decision phase.
    pub groups_evaluated: u32,
    /// Groups skipped because a read failed.
    pub faults: u32,
    /// Accepted actions by kind.
    pub actions: BTreeMap<ActionKind, u32>,
    /// Declines by reason, including claim rejections.
    pub declines: BTreeMap<DeclineReason, u32>,
    /// Mutations in the committed batch.
    pub mutations: usize,
}

impl TickSummary {
    const fn new(tick: u64, timestamp: DateTime<Utc>) -> Self {
        Self {
            tick,
            timestamp,
            groups_evaluated: 0,
            faults: 0,
            actions: BTreeMap::new(),
            declines: BTreeMap::new(),
            mutations: 0,
        }
    }

    /// Number of accepted actions.
    pub fn acted(&self) -> u32 {
        self.actions.values().fold(0, |acc, n| acc.saturating_add(*n))
    }

    /// Number of declined groups.
    pub fn declined(&self) -> u32 {
        self.declines.values().fold(0, |acc, n| acc.saturating_add(*n))
    }

    /// Accepted actions of one kind.
    pub fn action_count(&self, kind: ActionKind) -> u32 {
        self.actions.get(&kind).copied().unwrap_or(0)
    }

    /// Declines for one reason.
    pub fn decline_count(&self, reason: DeclineReason) -> u32 {
        self.declines.get(&reason).copied().unwrap_or(0)
    }

    fn record_action(&mut self, kind: ActionKind) {
        let n = self.actions.entry(kind).or_insert(0);
        *n = n.saturating_add(1);
    }

    fn record_decline(&mut self, reason: DeclineReason) {
        let n = self.declines.entry(reason).or_insert(0);
        *n = n.saturating_add(1);
    }
}

/// Decisions of one tick, merged and ready to commit.
#[derive(Debug, Clone)]
pub struct TickPlan {
    summary: TickSummary,
    batch: MutationBatch,
}

impl TickPlan {
    /// Counters gathered while deciding.
    pub const fn summary(&self) -> &TickSummary {
        &self.summary
    }

    /// The merged batch.
    pub const fn batch(&self) -> &MutationBatch {
        &self.batch
    }

    /// Commit the batch atomically and return the final summary.
    pub fn commit(self, sink: &mut dyn MutationSink) -> Result<TickSummary, TickError> {
        let Self { mut summary, batch } = self;
        summary.mutations = batch.len();
        if batch.is_empty() {
            debug!(tick = summary.tick, "Nothing to commit");
        } else {
            sink.commit(batch)?;
        }

        info!(
            tick = summary.tick,
            groups = summary.groups_evaluated,
            acted = summary.acted(),
            declined = summary.declined(),
            claimed = summary.decline_count(DeclineReason::TileClaimed),
            faults = summary.faults,
            mutations = summary.mutations,
            "Tick complete"
        );
        Ok(summary)
    }
}

/// Run the read and decide phases of one tick.
pub fn evaluate_tick(
    tick: u64,
    now: DateTime<Utc>,
    config: &SimulationConfig,
    inputs: &TickInputs<'_>,
    rng: &mut dyn RandomSource,
) -> Result<TickPlan, TickError> {
    let roster = inputs.roster.monster_groups()?;
    debug!(tick, groups = roster.len(), "Tick started");

    let mut summary = TickSummary::new(tick, now);
    let mut cache = ChunkCache::new();
    let mut ledger = ClaimLedger::new();
    let mut founded = FoundedSites::new();
    let mut batch = MutationBatch::new();

    for located in &roster {
        let outcome = match decide_one(located, now, config, inputs, &mut cache, rng) {
            Ok(Some(outcome)) => outcome,
            Ok(None) => {
                debug!(tick, group_id = %located.id, "Group no longer on its tile");
                continue;
            }
            Err(err) => {
                warn!(tick, group_id = %located.id, %err, "Group skipped");
                summary.faults = summary.faults.saturating_add(1);
                continue;
            }
        };
        summary.groups_evaluated = summary.groups_evaluated.saturating_add(1);

        let action = match outcome {
            Outcome::Acted(action) => action,
            Outcome::Declined(reason) => {
                summary.record_decline(reason);
                continue;
            }
        };

        let sites = FoundedSites::new_sites(&action.mutations, &cache);
        match density_reached(&sites, located.at, config, inputs, &mut cache, &founded) {
            Ok(false) => {}
            Ok(true) => {
                debug!(
                    tick,
                    group_id = %located.id,
                    action = %action.kind,
                    "Outcome rejected: structure density reached this tick"
                );
                summary.record_decline(DeclineReason::TileClaimed);
                continue;
            }
            Err(err) => {
                warn!(tick, group_id = %located.id, %err, "Density re-check failed");
                summary.faults = summary.faults.saturating_add(1);
                continue;
            }
        }

        match ledger.try_claim(&action.mutations) {
            Ok(()) => {
                summary.record_action(action.kind);
                founded.record(sites);
                batch.extend(action.mutations);
            }
            Err(claimed) => {
                debug!(
                    tick,
                    group_id = %located.id,
                    action = %action.kind,
                    %claimed,
                    "Outcome rejected"
                );
                summary.record_decline(DeclineReason::TileClaimed);
            }
        }
    }

    Ok(TickPlan { summary, batch })
}

/// Run one complete tick against separate read and write collaborators.
pub fn run_tick(
    tick: u64,
    now: DateTime<Utc>,
    config: &SimulationConfig,
    inputs: &TickInputs<'_>,
    sink: &mut dyn MutationSink,
    rng: &mut dyn RandomSource,
) -> Result<TickSummary, TickError> {
    evaluate_tick(tick, now, config, inputs, rng)?.commit(sink)
}

/// Read the group's surroundings and decide. `None` when the group is no
/// longer stored where the roster placed it.
fn decide_one(
    located: &GroupLocation,
    now: DateTime<Utc>,
    config: &SimulationConfig,
    inputs: &TickInputs<'_>,
    cache: &mut ChunkCache,
    rng: &mut dyn RandomSource,
) -> Result<Option<Outcome>, WorldError> {
    cache.load_around(inputs.store, located.at, config.tick.chunk_radius)?;
    let cache: &ChunkCache = cache;
    let Some(group) = cache.group(located.at, located.id) else {
        return Ok(None);
    };
    let scan = inputs.scans.scan(&config.world.world_id, located.at)?;

    let ctx = DecisionContext {
        chunks: cache,
        scan: &scan,
        terrain: inputs.terrain,
        config: &config.ai,
        now,
    };
    Ok(Some(decide(group, &ctx, rng)))
}

/// Whether any of `sites` would reach the structure density cap, around
/// the site or around the founding group, once the structures founded
/// earlier this tick are counted.
#[allow(clippy::cast_possible_truncation)] // density radii are a few tiles
fn density_reached(
    sites: &[TileCoord],
    group_at: TileCoord,
    config: &SimulationConfig,
    inputs: &TickInputs<'_>,
    cache: &mut ChunkCache,
    founded: &FoundedSites,
) -> Result<bool, WorldError> {
    if sites.is_empty() || founded.is_empty() {
        return Ok(false);
    }
    let radius = config.ai.structure_density_radius;
    let cap = config.ai.structure_density_cap;
    let reach = radius.max(0.0).ceil() as i32;
    for site in sites {
        cache.load_around(inputs.store, *site, reach)?;
    }
    let cache: &ChunkCache = cache;
    let reached = |center: TileCoord| {
        let standing = cache
            .structures_within(center, radius)
            .filter(|s| s.monster)
            .count();
        standing.saturating_add(founded.count_within(center, radius)) >= cap
    };
    Ok(reached(group_at) || sites.iter().any(|site| reached(*site)))
}
