//! Power estimates for groups and structures.
//!
//! Power is a rough strength figure used only to gate decisions (should
//! this group pick a fight?). Damage is resolved elsewhere.

use std::collections::BTreeMap;

use warband_types::{Group, Structure, StructureKind, StructureSummary, Unit, UnitId};
use warband_world::blueprint;

/// Wounded units never count for less than this fraction of their strength.
const MIN_HEALTH_FACTOR: f64 = 0.1;

/// Extra defence per structure level above 1.
const LEVEL_BONUS: f64 = 0.25;

/// Durability points per point of defence power.
const DURABILITY_PER_POWER: f64 = 10.0;

/// Summed strength of a unit map, discounted by wounds.
pub fn units_power(units: &BTreeMap<UnitId, Unit>) -> f64 {
    units
        .values()
        .map(|u| u.strength.max(0.0) * u.health_fraction().max(MIN_HEALTH_FACTOR))
        .sum()
}

/// Power of a group.
pub fn group_power(group: &Group) -> f64 {
    units_power(&group.units)
}

/// Combined power of several groups.
pub fn combined_power<'a>(groups: impl IntoIterator<Item = &'a Group>) -> f64 {
    groups.into_iter().map(group_power).sum()
}

/// Defence estimate from the static definition, scaled by level and by the
/// current health fraction.
pub fn structure_power(kind: StructureKind, level: u32, health_fraction: f64) -> f64 {
    let base = f64::from(blueprint(kind).durability) / DURABILITY_PER_POWER;
    let level_factor = 1.0 + LEVEL_BONUS * f64::from(level.max(1).saturating_sub(1));
    base * level_factor * health_fraction.clamp(0.0, 1.0)
}

/// Defence estimate of a structure record.
pub fn estimate_structure_power(structure: &Structure) -> f64 {
    structure_power(
        structure.kind,
        structure.current_level(),
        structure.health_fraction(),
    )
}

/// Defence estimate of a scanned structure. A provider-supplied figure wins.
pub fn summary_power(summary: &StructureSummary) -> f64 {
    if let Some(power) = summary.defense_power {
        return power.max(0.0);
    }
    let fraction = if summary.max_health == 0 {
        1.0
    } else {
        f64::from(summary.health) / f64::from(summary.max_health)
    };
    structure_power(summary.kind, summary.level, fraction)
}

/// Ratio of own power to opposing power. An opponent with no power yields
/// `f64::INFINITY`.
pub fn power_ratio(own: f64, opposing: f64) -> f64 {
    if opposing <= f64::EPSILON {
        return f64::INFINITY;
    }
    own / opposing
}

#[cfg(test)]
mod tests {
    use warband_types::StructureId;

    use super::*;

    #[test]
    fn wounded_units_count_less() {
        let mut units = BTreeMap::new();
        units.insert(UnitId::new(), Unit::new("orc", 2.0));
        let mut hurt = Unit::new("orc", 2.0);
        hurt.health = 50;
        units.insert(UnitId::new(), hurt);
        assert!((units_power(&units) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn structure_power_scales_with_health_and_level() {
        let full = structure_power(StructureKind::Outpost, 1, 1.0);
        let half = structure_power(StructureKind::Outpost, 1, 0.5);
        let upgraded = structure_power(StructureKind::Outpost, 3, 1.0);
        assert!((full - 30.0).abs() < 1e-9);
        assert!((half - 15.0).abs() < 1e-9);
        assert!((upgraded - 45.0).abs() < 1e-9);
    }

    #[test]
    fn scanned_structures_use_their_reported_level() {
        let mut summary = StructureSummary {
            id: StructureId::new(),
            kind: StructureKind::Outpost,
            level: 3,
            defense_power: None,
            health: 50,
            max_health: 100,
            owner: String::from("settlers"),
            monster: false,
        };
        assert!((summary_power(&summary) - 22.5).abs() < 1e-9);

        summary.level = 0;
        assert!((summary_power(&summary) - 15.0).abs() < 1e-9);

        summary.defense_power = Some(7.0);
        assert!((summary_power(&summary) - 7.0).abs() < 1e-9);
    }

    #[test]
    fn ratio_against_nothing_is_infinite() {
        assert!(power_ratio(3.0, 0.0).is_infinite());
        assert!((power_ratio(3.0, 6.0) - 0.5).abs() < 1e-9);
    }
}
