//! Static structure and inner-building definitions.
//!
//! - [`blueprint`] returns the definition of each [`StructureKind`]
//! - [`building_blueprint`] returns the definition of each [`BuildingKind`]
//! - [`structure_upgrade_cost`] and [`building_upgrade_cost`] scale costs
//!   linearly with the current level
//! - [`feature_for_level`] names the feature unlocked at a level

use std::collections::{BTreeMap, BTreeSet};

use warband_types::{BuildingKind, ItemCode, StructureFeature, StructureKind};

/// Highest level a structure can reach.
pub const MAX_STRUCTURE_LEVEL: u32 = 5;

/// Highest level an inner building can reach.
pub const MAX_BUILDING_LEVEL: u32 = 3;

/// Item codes referenced by the definitions.
pub mod items {
    /// Basic construction material.
    pub const WOODEN_STICKS: &str = "WOODEN_STICKS";
    /// Basic construction material.
    pub const STONE: &str = "STONE";
    /// Monster building material.
    pub const BONE: &str = "BONE";
    /// Tanned skins.
    pub const HIDE: &str = "HIDE";
    /// Rare; required for upgrades from level 2.
    pub const IRON_ORE: &str = "IRON_ORE";
    /// Rare; required for upgrades from level 3.
    pub const CRYSTAL: &str = "CRYSTAL";
}

/// Static definition of a structure kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureBlueprint {
    /// Kind described.
    pub kind: StructureKind,
    /// Default display name.
    pub name: &'static str,
    /// Seconds to construct.
    pub build_time_secs: u32,
    /// Unit capacity.
    pub capacity: u32,
    /// Items consumed when founding.
    pub build_cost: BTreeMap<ItemCode, u32>,
    /// Hit points at full health; the basis of defence estimates.
    pub durability: u32,
}

/// Static definition of an inner building kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildingBlueprint {
    /// Kind described.
    pub kind: BuildingKind,
    /// Display name.
    pub name: &'static str,
    /// Items consumed when added at level 1.
    pub cost: BTreeMap<ItemCode, u32>,
}

fn cost<const N: usize>(entries: [(&str, u32); N]) -> BTreeMap<ItemCode, u32> {
    entries
        .into_iter()
        .map(|(code, qty)| (ItemCode::new(code), qty))
        .collect()
}

// ---------------------------------------------------------------------------
// Blueprints
// ---------------------------------------------------------------------------

/// Return the definition for a structure kind.
///
/// Player kinds carry no build cost; monsters never found them.
pub fn blueprint(kind: StructureKind) -> StructureBlueprint {
    match kind {
        // ---- Player ----
        StructureKind::Spawn => StructureBlueprint {
            kind,
            name: "Spawn",
            build_time_secs: 0,
            capacity: 50,
            build_cost: BTreeMap::new(),
            durability: 1000,
        },
        StructureKind::Outpost => StructureBlueprint {
            kind,
            name: "Outpost",
            build_time_secs: 600,
            capacity: 10,
            build_cost: BTreeMap::new(),
            durability: 300,
        },
        StructureKind::Watchtower => StructureBlueprint {
            kind,
            name: "Watchtower",
            build_time_secs: 900,
            capacity: 5,
            build_cost: BTreeMap::new(),
            durability: 250,
        },
        StructureKind::Fortress => StructureBlueprint {
            kind,
            name: "Fortress",
            build_time_secs: 3600,
            capacity: 40,
            build_cost: BTreeMap::new(),
            durability: 800,
        },

        // ---- Monster ----
        StructureKind::MonsterLair => StructureBlueprint {
            kind,
            name: "Lair",
            build_time_secs: 300,
            capacity: 10,
            build_cost: cost([(items::WOODEN_STICKS, 5), (items::STONE, 3)]),
            durability: 200,
        },
        StructureKind::MonsterHive => StructureBlueprint {
            kind,
            name: "Hive",
            build_time_secs: 450,
            capacity: 15,
            build_cost: cost([(items::WOODEN_STICKS, 8), (items::BONE, 5)]),
            durability: 250,
        },
        StructureKind::MonsterWarcamp => StructureBlueprint {
            kind,
            name: "Warcamp",
            build_time_secs: 600,
            capacity: 20,
            build_cost: cost([
                (items::WOODEN_STICKS, 10),
                (items::STONE, 5),
                (items::HIDE, 3),
            ]),
            durability: 300,
        },
        StructureKind::MonsterStronghold => StructureBlueprint {
            kind,
            name: "Stronghold",
            build_time_secs: 1200,
            capacity: 30,
            build_cost: cost([
                (items::STONE, 15),
                (items::WOODEN_STICKS, 10),
                (items::IRON_ORE, 5),
            ]),
            durability: 600,
        },
    }
}

/// Return the definition for an inner building kind.
pub fn building_blueprint(kind: BuildingKind) -> BuildingBlueprint {
    match kind {
        BuildingKind::Barracks => BuildingBlueprint {
            kind,
            name: "Barracks",
            cost: cost([(items::WOODEN_STICKS, 6), (items::STONE, 2)]),
        },
        BuildingKind::Storehouse => BuildingBlueprint {
            kind,
            name: "Storehouse",
            cost: cost([(items::WOODEN_STICKS, 8)]),
        },
        BuildingKind::Forge => BuildingBlueprint {
            kind,
            name: "Forge",
            cost: cost([(items::STONE, 6), (items::IRON_ORE, 2)]),
        },
        BuildingKind::Shrine => BuildingBlueprint {
            kind,
            name: "Shrine",
            cost: cost([(items::BONE, 6), (items::STONE, 2)]),
        },
        BuildingKind::Watchpost => BuildingBlueprint {
            kind,
            name: "Watchpost",
            cost: cost([(items::WOODEN_STICKS, 4), (items::HIDE, 1)]),
        },
    }
}

// ---------------------------------------------------------------------------
// Upgrades
// ---------------------------------------------------------------------------

/// Items needed to take a structure from `current_level` to the next.
///
/// The base build cost scales linearly with the current level. From level 2
/// iron ore is added and from level 3 crystal, both also scaling with level.
pub fn structure_upgrade_cost(kind: StructureKind, current_level: u32) -> BTreeMap<ItemCode, u32> {
    let level = current_level.max(1);
    let base = blueprint(kind).build_cost;
    let base = if base.is_empty() {
        cost([(items::WOODEN_STICKS, 5), (items::STONE, 5)])
    } else {
        base
    };
    let mut total: BTreeMap<ItemCode, u32> = base
        .into_iter()
        .map(|(code, qty)| (code, qty.saturating_mul(level)))
        .collect();
    if level >= 2 {
        let extra = total.entry(ItemCode::new(items::IRON_ORE)).or_insert(0);
        *extra = extra.saturating_add(level.saturating_sub(1).saturating_mul(2));
    }
    if level >= 3 {
        let extra = total.entry(ItemCode::new(items::CRYSTAL)).or_insert(0);
        *extra = extra.saturating_add(level.saturating_sub(2));
    }
    total
}

/// Items needed to take an inner building from `current_level` to the next.
pub fn building_upgrade_cost(kind: BuildingKind, current_level: u32) -> BTreeMap<ItemCode, u32> {
    let factor = current_level.max(1).saturating_add(1);
    building_blueprint(kind)
        .cost
        .into_iter()
        .map(|(code, qty)| (code, qty.saturating_mul(factor)))
        .collect()
}

/// Feature unlocked on reaching `level`, if any.
pub const fn feature_for_level(level: u32) -> Option<StructureFeature> {
    match level {
        2 => Some(StructureFeature::Palisade),
        3 => Some(StructureFeature::Armory),
        4 => Some(StructureFeature::WarBanners),
        5 => Some(StructureFeature::DreadAura),
        _ => None,
    }
}

/// Every feature a structure at `level` has unlocked.
pub fn features_up_to(level: u32) -> BTreeSet<StructureFeature> {
    (2..=level.min(MAX_STRUCTURE_LEVEL))
        .filter_map(feature_for_level)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monster_kinds_have_costs_and_player_kinds_do_not() {
        for kind in StructureKind::MONSTER_BUILDABLE {
            assert!(!blueprint(kind).build_cost.is_empty(), "{kind:?}");
        }
        assert!(blueprint(StructureKind::Spawn).build_cost.is_empty());
    }

    #[test]
    fn upgrade_cost_is_linear_with_rare_extras() {
        let wood = ItemCode::new(items::WOODEN_STICKS);
        let iron = ItemCode::new(items::IRON_ORE);
        let crystal = ItemCode::new(items::CRYSTAL);

        let l1 = structure_upgrade_cost(StructureKind::MonsterLair, 1);
        assert_eq!(l1.get(&wood), Some(&5));
        assert!(!l1.contains_key(&iron));

        let l2 = structure_upgrade_cost(StructureKind::MonsterLair, 2);
        assert_eq!(l2.get(&wood), Some(&10));
        assert_eq!(l2.get(&iron), Some(&2));
        assert!(!l2.contains_key(&crystal));

        let l3 = structure_upgrade_cost(StructureKind::MonsterLair, 3);
        assert_eq!(l3.get(&iron), Some(&4));
        assert_eq!(l3.get(&crystal), Some(&1));
    }

    #[test]
    fn features_unlock_at_levels_two_to_five() {
        assert_eq!(feature_for_level(1), None);
        assert_eq!(features_up_to(1).len(), 0);
        assert_eq!(features_up_to(3).len(), 2);
        assert_eq!(features_up_to(9).len(), 4);
    }

    #[test]
    fn building_upgrade_scales() {
        let wood = ItemCode::new(items::WOODEN_STICKS);
        let c = building_upgrade_cost(BuildingKind::Storehouse, 2);
        assert_eq!(c.get(&wood), Some(&24));
    }
}
