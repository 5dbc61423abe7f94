//! Monster decision engine for the Warband simulation.
//!
//! Every tick, each monster group gets exactly one call to [`decide`]. The
//! call reads a tick-scoped [`DecisionContext`] (chunk cache, world scan,
//! terrain oracle, config) and returns an [`Outcome`]: either an action with
//! the mutations implementing it, or a decline reason. Nothing here performs
//! I/O or mutates shared state; the tick driver merges and commits the
//! mutations.
//!
//! # Modules
//!
//! - [`behavior`] -- The per-group entry point and idle priority chain.
//! - [`combat`] -- Merging, attacks, and joining battles.
//! - [`config`] -- [`AiConfig`], every decision tunable.
//! - [`construction`] -- Founding, upgrades, inner buildings,
//!   demobilisation, and adoption.
//! - [`context`] -- The read-only [`DecisionContext`].
//! - [`error`] -- Error types for resource accounting.
//! - [`gather`] -- Starting to gather on a tile.
//! - [`interrupt`] -- Re-evaluating a march after the grace period.
//! - [`inventory`] -- All-or-nothing resource consumption.
//! - [`movement`] -- Hops, bounded paths, and waypoint progression.
//! - [`outcome`] -- [`Outcome`], [`Action`], and [`DeclineReason`].
//! - [`personality`] -- Per-archetype weight tables.
//! - [`power`] -- Group and structure power estimates.
//! - [`random`] -- The injectable [`RandomSource`].
//! - [`targeting`] -- Destination selection.
//! - [`wander`] -- Heading choice and landmark seeking.

pub mod behavior;
pub mod combat;
pub mod config;
pub mod construction;
pub mod context;
pub mod error;
pub mod gather;
pub mod interrupt;
pub mod inventory;
pub mod movement;
pub mod outcome;
pub mod personality;
pub mod power;
pub mod random;
pub mod targeting;
pub mod wander;

// Re-export primary types at crate root.
pub use behavior::decide;
pub use config::AiConfig;
pub use context::DecisionContext;
pub use error::AiError;
pub use interrupt::{InterruptDecision, InterruptReason, evaluate_interrupt};
pub use outcome::{Action, ActionKind, DeclineReason, Outcome};
pub use personality::{PersonalityWeights, weights};
pub use random::{FixedSequence, RandomSource, SeededRandom};
pub use targeting::{Target, select_target};
