//! Simulation loop runner.
//!
//! [`run_simulation`] drives [`evaluate_tick`] and [`TickPlan::commit`]
//! against one world that implements every collaborator contract. It
//! stops after `tick.max_ticks` ticks (when non-zero) or on Ctrl-C, and
//! sleeps `tick.interval_ms` between ticks.
//!
//! [`TickPlan::commit`]: crate::tick::TickPlan::commit

use chrono::Utc;
use tracing::{info, warn};

use warband_ai::RandomSource;
use warband_world::{ChunkStore, MonsterRoster, TerrainOracle, WorldScanProvider};

use crate::config::SimulationConfig;
use crate::sink::MutationSink;
use crate::tick::{TickError, TickInputs, TickSummary, evaluate_tick};

/// Errors that can occur during the simulation run.
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// A tick execution failed.
    #[error("tick error: {source}")]
    Tick {
        /// The underlying tick error.
        #[from]
        source: TickError,
    },
}

/// Why the loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimulationEndReason {
    /// `tick.max_ticks` ticks ran.
    MaxTicksReached,
    /// The process received Ctrl-C.
    Interrupted,
}

/// Result of the simulation run.
#[derive(Debug)]
pub struct SimulationResult {
    /// The reason the simulation ended.
    pub end_reason: SimulationEndReason,
    /// The last tick summary, if any tick completed.
    pub final_summary: Option<TickSummary>,
    /// Total number of ticks executed.
    pub total_ticks: u64,
}

/// Callback invoked after each tick completes.
pub trait TickCallback {
    /// Called after a tick committed.
    fn on_tick(&mut self, summary: &TickSummary);
}

/// A no-op tick callback.
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary) {}
}

/// Run the tick loop until a termination condition is met.
///
/// # Errors
///
/// Returns [`RunnerError`] if a tick fails unrecoverably.
pub async fn run_simulation<W>(
    world: &mut W,
    terrain: &dyn TerrainOracle,
    config: &SimulationConfig,
    rng: &mut dyn RandomSource,
    callback: &mut dyn TickCallback,
) -> Result<SimulationResult, RunnerError>
where
    W: MonsterRoster + ChunkStore + WorldScanProvider + MutationSink,
{
    let max_ticks = config.tick.max_ticks;
    let interval = tokio::time::Duration::from_millis(config.tick.interval_ms);
    let mut total_ticks: u64 = 0;

    info!(
        world_id = %config.world.world_id,
        max_ticks,
        tick_interval_ms = config.tick.interval_ms,
        "Simulation starting"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        let tick = total_ticks.saturating_add(1);
        let plan = {
            let inputs = TickInputs::from_world(&*world, terrain);
            evaluate_tick(tick, Utc::now(), config, &inputs, rng)?
        };
        let summary = plan.commit(world)?;
        total_ticks = tick;
        callback.on_tick(&summary);

        if max_ticks > 0 && total_ticks >= max_ticks {
            info!(tick, max_ticks, "Tick limit reached");
            return Ok(SimulationResult {
                end_reason: SimulationEndReason::MaxTicksReached,
                final_summary: Some(summary),
                total_ticks,
            });
        }

        tokio::select! {
            () = tokio::time::sleep(interval) => {}
            signal = &mut shutdown => {
                if let Err(err) = signal {
                    warn!(%err, "Failed to listen for Ctrl-C");
                }
                info!(tick, "Interrupted");
                return Ok(SimulationResult {
                    end_reason: SimulationEndReason::Interrupted,
                    final_summary: Some(summary),
                    total_ticks,
                });
            }
        }
    }
}

/// Log the simulation end sequence.
pub fn log_simulation_end(result: &SimulationResult) {
    info!(
        reason = ?result.end_reason,
        total_ticks = result.total_ticks,
        final_tick = result.final_summary.as_ref().map(|s| s.tick),
        "Simulation ended"
    );

    if let Some(ref summary) = result.final_summary {
        info!(
            tick = summary.tick,
            acted = summary.acted(),
            declined = summary.declined(),
            faults = summary.faults,
            "Final tick summary"
        );
    } else {
        warn!("Simulation ended with no ticks executed");
    }
}
