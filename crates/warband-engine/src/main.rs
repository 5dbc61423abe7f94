//! Engine binary for the Warband simulation.
//!
//! This is the main entry point that wires together configuration, the
//! procedural terrain, a seeded demo world and the tick loop, then runs
//! until the tick limit or Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `warband-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Create the procedural terrain from the world seed
//! 4. Seed the in-memory world with spawns, deposits and warbands
//! 5. Run the simulation loop
//! 6. Log the result

mod demo;
mod error;
mod terrain;

use std::path::Path;

use chrono::Utc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use warband_ai::SeededRandom;
use warband_core::config::LoggingConfig;
use warband_core::runner::{self, NoOpCallback};
use warband_core::{InMemoryWorld, SimulationConfig};

use crate::demo::DemoConfig;
use crate::error::EngineError;
use crate::terrain::NoiseTerrain;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "warband-config.yaml";

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step or the simulation itself fails.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, from_file) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!("warband-engine starting");
    if !from_file {
        info!("Config file not found, using defaults");
    }
    info!(
        world_name = config.world.name,
        world_id = config.world.world_id,
        seed = config.world.seed,
        tick_interval_ms = config.tick.interval_ms,
        max_ticks = config.tick.max_ticks,
        "Configuration loaded"
    );

    // 3. Create the terrain.
    let terrain = NoiseTerrain::new(config.world.seed);

    // 4. Seed the world.
    let demo_config = load_demo_config()?;
    let mut world = InMemoryWorld::new(config.world.world_id.clone(), config.tick.scan_radius);
    demo::seed_world(
        &mut world,
        &terrain,
        &demo_config,
        config.world.seed,
        Utc::now(),
    )?;

    // 5. Run the simulation.
    let mut rng = SeededRandom::new(config.world.seed);
    let result =
        runner::run_simulation(&mut world, &terrain, &config, &mut rng, &mut NoOpCallback)
            .await
            .map_err(EngineError::from)?;

    // 6. Log results.
    runner::log_simulation_end(&result);
    info!(
        chat_lines = world.chat().len(),
        commits = world.commit_count(),
        "warband-engine shutdown complete"
    );

    Ok(())
}

/// Install the tracing subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(config: &LoggingConfig) -> Result<(), EngineError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| EngineError::Logging {
            message: format!("invalid log filter: {e}"),
        })?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| EngineError::Logging {
        message: format!("{e}"),
    })
}

/// Load the main configuration from `warband-config.yaml`, falling back to
/// defaults (plus environment overrides) when the file is absent.
fn load_config() -> Result<(SimulationConfig, bool), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok((SimulationConfig::from_file(config_path)?, true))
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides()?;
        Ok((config, false))
    }
}

/// Load the demo world configuration from the `demo` section of
/// `warband-config.yaml`. Missing file or section yields defaults.
fn load_demo_config() -> Result<DemoConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        return Ok(DemoConfig::default());
    }
    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Seeding {
        message: format!("failed to read config file: {e}"),
    })?;
    let raw: serde_yml::Value = serde_yml::from_str(&contents).map_err(|e| EngineError::Seeding {
        message: format!("failed to parse config YAML: {e}"),
    })?;
    match raw.get("demo") {
        Some(demo) => serde_yml::from_value(demo.clone()).map_err(|e| EngineError::Seeding {
            message: format!("failed to parse demo config: {e}"),
        }),
        None => Ok(DemoConfig::default()),
    }
}
