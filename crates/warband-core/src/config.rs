//! Configuration loading and typed config structures for the Warband engine.
//!
//! The canonical configuration lives in `warband-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads the file and applies
//! environment overrides. Every key is optional; omitted keys keep their
//! defaults.

use std::path::Path;

use serde::Deserialize;

use warband_ai::AiConfig;

/// Environment variable overriding `world.seed`.
pub const SEED_ENV: &str = "WARBAND_SEED";

/// Environment variable overriding `tick.interval_ms`.
pub const TICK_INTERVAL_ENV: &str = "WARBAND_TICK_INTERVAL_MS";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value that does not parse.
    #[error("invalid value {value:?} for {var}")]
    InvalidOverride {
        /// The environment variable.
        var: &'static str,
        /// The raw value it held.
        value: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `warband-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World identity and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Tick cadence and read bounds.
    #[serde(default)]
    pub tick: TickConfig,

    /// Decision tunables.
    #[serde(default)]
    pub ai: AiConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `WARBAND_SEED` overrides `world.seed`
    /// - `WARBAND_TICK_INTERVAL_MS` overrides `tick.interval_ms`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override does not parse.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string, then apply environment
    /// overrides.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::InvalidOverride`] if an override does not parse.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Override seed and tick interval from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(SEED_ENV) {
            self.world.seed = parse_override(SEED_ENV, value)?;
        }
        if let Some(value) = lookup(TICK_INTERVAL_ENV) {
            self.tick.interval_ms = parse_override(TICK_INTERVAL_ENV, value)?;
        }
        Ok(())
    }
}

fn parse_override(var: &'static str, value: String) -> Result<u64, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { var, value })
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable world name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Store identifier; every write lands under `worlds/{world_id}`.
    #[serde(default = "default_world_id")]
    pub world_id: String,

    /// Random seed for terrain and decisions.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            world_id: default_world_id(),
            seed: default_seed(),
        }
    }
}

/// Tick cadence and per-group read bounds.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TickConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub interval_ms: u64,

    /// Tiles around each group whose chunks are loaded before deciding.
    #[serde(default = "default_chunk_radius")]
    pub chunk_radius: i32,

    /// Radius of the per-group world scan, in tiles.
    #[serde(default = "default_scan_radius")]
    pub scan_radius: f64,

    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_tick_interval_ms(),
            chunk_radius: default_chunk_radius(),
            scan_radius: default_scan_radius(),
            max_ticks: 0,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit newline-delimited JSON instead of human-readable lines.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    String::from("Warband")
}

fn default_world_id() -> String {
    String::from("default")
}

const fn default_seed() -> u64 {
    42
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_chunk_radius() -> i32 {
    20
}

const fn default_scan_radius() -> f64 {
    40.0
}

fn default_log_level() -> String {
    String::from("info")
}
