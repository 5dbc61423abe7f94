//! Terrain traversal capability derived from a group's `motion` set.

use std::collections::BTreeSet;

use warband_types::{Group, Motion, TileCoord};

use crate::terrain::TerrainOracle;

/// Which kinds of terrain a group may enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mobility {
    land: bool,
    water: bool,
}

impl Mobility {
    /// Walks on land only.
    pub const LAND_ONLY: Self = Self {
        land: true,
        water: false,
    };

    /// Swims only.
    pub const WATER_ONLY: Self = Self {
        land: false,
        water: true,
    };

    /// Goes anywhere.
    pub const AMPHIBIOUS: Self = Self {
        land: true,
        water: true,
    };

    /// Derive mobility from a motion set. An empty set is land-only and
    /// flight traverses both.
    pub fn from_motion(motion: &BTreeSet<Motion>) -> Self {
        if motion.is_empty() {
            return Self::LAND_ONLY;
        }
        let flight = motion.contains(&Motion::Flight);
        Self {
            land: flight || motion.contains(&Motion::Land),
            water: flight || motion.contains(&Motion::Water),
        }
    }

    /// Mobility of a group.
    pub fn of(group: &Group) -> Self {
        Self::from_motion(&group.motion)
    }

    /// Whether land tiles are enterable.
    pub const fn can_traverse_land(self) -> bool {
        self.land
    }

    /// Whether water tiles are enterable.
    pub const fn can_traverse_water(self) -> bool {
        self.water
    }

    /// Whether a tile of the given wetness is enterable.
    pub const fn accepts(self, is_water: bool) -> bool {
        if is_water { self.water } else { self.land }
    }

    /// Whether the tile at `at` is enterable.
    pub fn can_enter(self, terrain: &dyn TerrainOracle, at: TileCoord) -> bool {
        self.accepts(terrain.is_water(at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_motion_is_land_only() {
        let m = Mobility::from_motion(&BTreeSet::new());
        assert_eq!(m, Mobility::LAND_ONLY);
        assert!(m.accepts(false));
        assert!(!m.accepts(true));
    }

    #[test]
    fn water_only_rejects_land() {
        let m = Mobility::from_motion(&BTreeSet::from([Motion::Water]));
        assert!(!m.can_traverse_land());
        assert!(m.can_traverse_water());
    }

    #[test]
    fn flight_goes_anywhere() {
        let m = Mobility::from_motion(&BTreeSet::from([Motion::Flight]));
        assert_eq!(m, Mobility::AMPHIBIOUS);
        let both = Mobility::from_motion(&BTreeSet::from([Motion::Land, Motion::Water]));
        assert_eq!(both, Mobility::AMPHIBIOUS);
    }
}
