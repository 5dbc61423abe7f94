//! Decision constants.
//!
//! [`AiConfig`] bundles every tunable the decision engine reads so that the
//! tick driver and tests can override defaults. It deserializes from the
//! `ai` section of `warband-config.yaml`; omitted keys keep their defaults.

use serde::Deserialize;

use warband_types::TileCoord;
use warband_world::{MAX_BUILDING_LEVEL, MAX_STRUCTURE_LEVEL};

/// Tunables for every decision component.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    // ---- Target selection ----
    /// Base weight of the monster-structure category (default: 1.0).
    pub monster_structure_weight: f64,
    /// Max distance of the monster-structure category (default: 30).
    pub monster_structure_max_distance: f64,
    /// Base weight of the resource-hotspot category (default: 1.2).
    pub resource_weight: f64,
    /// Max distance of the resource-hotspot category (default: 25).
    pub resource_max_distance: f64,
    /// Base weight of the player-spawn category (default: 0.8).
    pub player_spawn_weight: f64,
    /// Max distance of the player-spawn category (default: 40).
    pub player_spawn_max_distance: f64,
    /// Base weight of the player-structure category (default: 0.6).
    pub player_structure_weight: f64,
    /// Max distance of the player-structure category (default: 30).
    pub player_structure_max_distance: f64,
    /// Base weight of the monster-group category for weak groups (default: 0.5).
    pub monster_group_weight: f64,
    /// Max distance of the monster-group category (default: 20).
    pub monster_group_max_distance: f64,
    /// Max distance for explicit orders and home preference (default: 40).
    pub max_scan_distance: f64,
    /// Player-spawn multiplier while exploring (default: 4.0).
    pub exploration_spawn_multiplier: f64,
    /// Monster-structure multiplier while exploring (default: 0.1).
    pub exploration_home_multiplier: f64,
    /// Unit count at or above which a group counts as large (default: 10).
    pub large_group_units: u32,
    /// Unit count at or below which a group counts as small (default: 4).
    pub small_group_units: u32,
    /// Power below which a group counts as weak (default: 5.0).
    pub weak_group_power: f64,
    /// Chance a weak bold group ignores the power gate (default: 0.3).
    pub weak_bypass_chance: f64,
    /// Base chance of heading home when not exploring (default: 0.3).
    pub home_preference_chance: f64,
    /// Ring-search radius for relocating incompatible targets (default: 5).
    pub ring_search_radius: u32,

    // ---- Movement ----
    /// Targets at most this far away are reached with a single hop (default: 1.5).
    pub hop_distance: f64,
    /// Smallest random step budget (default: 1).
    pub min_path_steps: u32,
    /// Largest random step budget (default: 3).
    pub max_path_steps: u32,
    /// Seconds per step at speed 1.0 (default: 5).
    pub step_secs: u32,
    /// Speed boost while exploring (default: 1.3).
    pub exploration_speed_boost: f64,
    /// Chance an exploratory move is announced in chat (default: 0.1).
    pub exploratory_chat_chance: f64,

    // ---- Wandering ----
    /// Whether landmark-seeking wander is enabled (default: true).
    pub purposeful_wander: bool,
    /// Distance of the heading target picked by wandering (default: 6).
    pub wander_radius: i32,
    /// Radius searched for landmarks (default: 10).
    pub landmark_search_radius: i32,
    /// Interest lost per tile of landmark distance (default: 0.2).
    pub landmark_distance_penalty: f64,
    /// The world centre aggressive groups drift toward (default: origin).
    pub world_center: TileCoord,

    // ---- Interrupts ----
    /// Seconds after a move starts before it may be interrupted (default: 30).
    pub interrupt_grace_secs: u32,
    /// Base detection radius for pursuing better targets (default: 8).
    pub detection_radius: f64,
    /// Total items below which a group is resource-poor (default: 5).
    pub resource_poor_threshold: u32,
    /// Chance a bold group attacks when outmatched (default: 0.3).
    pub reckless_attack_chance: f64,

    // ---- Combat ----
    /// Max player groups pulled into one attack (default: 3).
    pub max_player_targets: usize,
    /// Max monster groups pulled into one attack (default: 2).
    pub max_monster_targets: usize,
    /// Chance a joining group takes the attacker side (default: 0.3).
    pub join_attacker_chance: f64,

    // ---- Construction ----
    /// Minimum units to found a structure (default: 3).
    pub min_units_for_building: u32,
    /// Max monster structures within the density radius (default: 3).
    pub structure_density_cap: usize,
    /// Radius of the density check (default: 10).
    pub structure_density_radius: f64,
    /// Minimum distance between a new structure and any player spawn (default: 5).
    pub min_spawn_distance: f64,
    /// Highest structure level (default: 5).
    pub max_structure_level: u32,
    /// Highest inner-building level (default: 3).
    pub max_building_level: u32,
    /// Chance of adopting a monster-owned construction site (default: 0.8).
    pub adopt_monster_chance: f64,
    /// Bonus adoption chance for builder and territorial groups (default: 0.1).
    pub adopt_personality_bonus: f64,
    /// Chance of adopting an eligible player construction site (default: 0.2).
    pub adopt_player_chance: f64,
    /// Hours without owner activity before a player site is abandoned (default: 24).
    pub adopt_inactivity_hours: i64,

    // ---- Idle rolls (scaled by personality) ----
    /// Chance an idle group tries to found a structure (default: 0.15).
    pub found_structure_chance: f64,
    /// Chance an idle group at home invests in its structure (default: 0.3).
    pub upgrade_chance: f64,
    /// Chance an idle resource-poor group gathers (default: 0.3).
    pub idle_gather_chance: f64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            monster_structure_weight: 1.0,
            monster_structure_max_distance: 30.0,
            resource_weight: 1.2,
            resource_max_distance: 25.0,
            player_spawn_weight: 0.8,
            player_spawn_max_distance: 40.0,
            player_structure_weight: 0.6,
            player_structure_max_distance: 30.0,
            monster_group_weight: 0.5,
            monster_group_max_distance: 20.0,
            max_scan_distance: 40.0,
            exploration_spawn_multiplier: 4.0,
            exploration_home_multiplier: 0.1,
            large_group_units: 10,
            small_group_units: 4,
            weak_group_power: 5.0,
            weak_bypass_chance: 0.3,
            home_preference_chance: 0.3,
            ring_search_radius: 5,
            hop_distance: 1.5,
            min_path_steps: 1,
            max_path_steps: 3,
            step_secs: 5,
            exploration_speed_boost: 1.3,
            exploratory_chat_chance: 0.1,
            purposeful_wander: true,
            wander_radius: 6,
            landmark_search_radius: 10,
            landmark_distance_penalty: 0.2,
            world_center: TileCoord::new(0, 0),
            interrupt_grace_secs: 30,
            detection_radius: 8.0,
            resource_poor_threshold: 5,
            reckless_attack_chance: 0.3,
            max_player_targets: 3,
            max_monster_targets: 2,
            join_attacker_chance: 0.3,
            min_units_for_building: 3,
            structure_density_cap: 3,
            structure_density_radius: 10.0,
            min_spawn_distance: 5.0,
            max_structure_level: MAX_STRUCTURE_LEVEL,
            max_building_level: MAX_BUILDING_LEVEL,
            adopt_monster_chance: 0.8,
            adopt_personality_bonus: 0.1,
            adopt_player_chance: 0.2,
            adopt_inactivity_hours: 24,
            found_structure_chance: 0.15,
            upgrade_chance: 0.3,
            idle_gather_chance: 0.3,
        }
    }
}
