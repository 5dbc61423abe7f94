//! Personality weight tables.
//!
//! Each [`Personality`] archetype maps to one static [`PersonalityWeights`]
//! value consumed by every decision component. Archetypes are never
//! compared as strings.

use warband_types::Personality;

/// Tunable multipliers and thresholds for one archetype.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PersonalityWeights {
    /// Appetite for exploration and roaming.
    pub explore: f64,
    /// Appetite for fighting players.
    pub attack: f64,
    /// Appetite for resources.
    pub gather: f64,
    /// Appetite for founding and upgrading structures.
    pub build: f64,
    /// Movement speed multiplier.
    pub speed: f64,
    /// Probability below which an interrupt check is skipped. Lower means
    /// more eager to abandon the current path.
    pub interrupt_threshold: f64,
    /// Scale applied to the interrupt detection radius.
    pub detection_scale: f64,
    /// Required ratio of own power to defender power. Below 1.0 accepts
    /// unfavourable odds.
    pub power_tolerance: f64,
    /// Whether this archetype attacks other monster groups.
    pub monster_aggression: bool,
}

impl PersonalityWeights {
    /// Probability of taking an adjacent attack opportunity.
    pub fn opportunism(&self) -> f64 {
        (self.attack / 2.0).clamp(0.0, 1.0)
    }
}

/// Whether the archetype takes fights against the odds.
pub const fn is_bold(personality: Personality) -> bool {
    matches!(personality, Personality::Aggressive | Personality::Feral)
}

/// Return the weight table for an archetype.
pub const fn weights(personality: Personality) -> PersonalityWeights {
    match personality {
        Personality::Aggressive => PersonalityWeights {
            explore: 1.0,
            attack: 1.8,
            gather: 0.6,
            build: 0.6,
            speed: 1.1,
            interrupt_threshold: 0.3,
            detection_scale: 1.2,
            power_tolerance: 0.5,
            monster_aggression: false,
        },
        Personality::Territorial => PersonalityWeights {
            explore: 0.6,
            attack: 1.2,
            gather: 0.9,
            build: 1.4,
            speed: 0.9,
            interrupt_threshold: 0.5,
            detection_scale: 1.0,
            power_tolerance: 0.8,
            monster_aggression: false,
        },
        Personality::Feral => PersonalityWeights {
            explore: 1.2,
            attack: 1.6,
            gather: 0.5,
            build: 0.3,
            speed: 1.2,
            interrupt_threshold: 0.2,
            detection_scale: 1.1,
            power_tolerance: 0.4,
            monster_aggression: true,
        },
        Personality::Cautious => PersonalityWeights {
            explore: 0.8,
            attack: 0.5,
            gather: 1.2,
            build: 1.1,
            speed: 0.8,
            interrupt_threshold: 0.7,
            detection_scale: 1.3,
            power_tolerance: 1.5,
            monster_aggression: false,
        },
        Personality::Nomadic => PersonalityWeights {
            explore: 1.8,
            attack: 0.8,
            gather: 1.0,
            build: 0.4,
            speed: 1.4,
            interrupt_threshold: 0.6,
            detection_scale: 1.0,
            power_tolerance: 1.0,
            monster_aggression: false,
        },
        Personality::Sneaky => PersonalityWeights {
            explore: 1.1,
            attack: 1.1,
            gather: 1.0,
            build: 0.7,
            speed: 1.1,
            interrupt_threshold: 0.4,
            detection_scale: 1.5,
            power_tolerance: 1.2,
            monster_aggression: false,
        },
        Personality::Builder => PersonalityWeights {
            explore: 0.7,
            attack: 0.6,
            gather: 1.3,
            build: 2.0,
            speed: 0.9,
            interrupt_threshold: 0.6,
            detection_scale: 1.0,
            power_tolerance: 1.2,
            monster_aggression: false,
        },
        Personality::Greedy => PersonalityWeights {
            explore: 1.0,
            attack: 0.9,
            gather: 1.8,
            build: 0.9,
            speed: 1.0,
            interrupt_threshold: 0.5,
            detection_scale: 1.1,
            power_tolerance: 1.0,
            monster_aggression: false,
        },
        Personality::Balanced => PersonalityWeights {
            explore: 1.0,
            attack: 1.0,
            gather: 1.0,
            build: 1.0,
            speed: 1.0,
            interrupt_threshold: 0.5,
            detection_scale: 1.0,
            power_tolerance: 1.0,
            monster_aggression: false,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_feral_fights_monsters() {
        for p in Personality::ALL {
            assert_eq!(weights(p).monster_aggression, p == Personality::Feral, "{p:?}");
        }
    }

    #[test]
    fn nomadic_fast_cautious_slow() {
        assert!(weights(Personality::Nomadic).speed > weights(Personality::Balanced).speed);
        assert!(weights(Personality::Cautious).speed < weights(Personality::Balanced).speed);
    }

    #[test]
    fn opportunism_is_a_probability() {
        for p in Personality::ALL {
            let o = weights(p).opportunism();
            assert!((0.0..=1.0).contains(&o));
        }
        assert!(weights(Personality::Aggressive).opportunism() > weights(Personality::Cautious).opportunism());
    }

    #[test]
    fn bold_archetypes_tolerate_worse_odds() {
        for p in Personality::ALL {
            if is_bold(p) {
                assert!(weights(p).power_tolerance < 1.0);
            }
        }
    }
}
