//! Configuration, tick driver, and world backends for the Warband engine.
//!
//! This crate turns per-group decisions into committed world state. It
//! owns the YAML configuration, the tick cycle with its claim ledger, the
//! mutation sinks, and an in-memory world that implements every
//! collaborator contract.
//!
//! # Modules
//!
//! - [`claims`] -- Per-tick claim ledger rejecting conflicting outcomes, plus
//!   the structures founded so far in the tick.
//! - [`config`] -- `warband-config.yaml` loading and env overrides.
//! - [`memory`] -- [`InMemoryWorld`], store, scan provider, roster and sink
//!   in one.
//! - [`runner`] -- The async tick loop.
//! - [`sink`] -- The [`MutationSink`] contract and a path-write recorder.
//! - [`tick`] -- One tick: read, decide, commit.

pub mod claims;
pub mod config;
pub mod memory;
pub mod runner;
pub mod sink;
pub mod tick;

// Re-export primary types at crate root.
pub use config::{ConfigError, SimulationConfig};
pub use memory::InMemoryWorld;
pub use runner::{RunnerError, SimulationResult, run_simulation};
pub use sink::{CommitError, MutationSink, PathWriteRecorder};
pub use tick::{TickError, TickInputs, TickPlan, TickSummary, evaluate_tick, run_tick};
