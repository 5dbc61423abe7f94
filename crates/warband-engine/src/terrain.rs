//! Seeded procedural terrain for the demo world.
//!
//! Value noise over a hashed integer lattice, bilinearly interpolated.
//! Height and moisture pick the biome; separate lake and river fields
//! carve inland water. Equal seeds produce equal worlds.

use warband_world::{Biome, TerrainData, TerrainOracle};

/// Lattice spacing of the height and moisture fields, in tiles.
const FEATURE_SCALE: i32 = 16;

/// Lattice spacing of the lake and river fields, in tiles.
const WATER_SCALE: i32 = 9;

/// Below this height a tile is ocean.
const SEA_LEVEL: f64 = 0.3;

/// Above this height a tile is mountains.
const MOUNTAIN_LEVEL: f64 = 0.78;

const TWO_POW_53: f64 = 9_007_199_254_740_992.0;

/// Field salts so the four fields are independent.
const HEIGHT: u64 = 0x9E37_79B9_7F4A_7C15;
const MOISTURE: u64 = 0xC2B2_AE3D_27D4_EB4F;
const LAKE: u64 = 0x1656_67B1_9E37_79F9;
const RIVER: u64 = 0x27D4_EB2F_1656_67C5;

/// Deterministic terrain generator.
#[derive(Debug, Clone, Copy)]
pub struct NoiseTerrain {
    seed: u64,
}

impl NoiseTerrain {
    /// Terrain for a world seed.
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }

    fn field(&self, salt: u64, scale: i32, x: i32, y: i32) -> f64 {
        let (cx, fx) = cell(x, scale);
        let (cy, fy) = cell(y, scale);
        let corner = |dx: i32, dy: i32| {
            lattice(
                self.seed ^ salt,
                cx.saturating_add(dx),
                cy.saturating_add(dy),
            )
        };
        let top = lerp(corner(0, 0), corner(1, 0), smooth(fx));
        let bottom = lerp(corner(0, 1), corner(1, 1), smooth(fx));
        lerp(top, bottom, smooth(fy))
    }
}

impl TerrainOracle for NoiseTerrain {
    fn terrain_at(&self, x: i32, y: i32) -> TerrainData {
        let height = self.field(HEIGHT, FEATURE_SCALE, x, y);
        let moisture = self.field(MOISTURE, FEATURE_SCALE, x, y);

        // Lakes sit in the upper tail of their field; rivers follow the
        // ridge where theirs crosses one half.
        let lake_value = ((self.field(LAKE, WATER_SCALE, x, y) - 0.7) * 2.0).clamp(0.0, 1.0);
        let ridge = (self.field(RIVER, WATER_SCALE, x, y) - 0.5).abs();
        let river_value = if height > SEA_LEVEL && height < MOUNTAIN_LEVEL {
            (1.0 - ridge * 40.0).clamp(0.0, 1.0)
        } else {
            0.0
        };

        TerrainData {
            biome: classify(height, moisture),
            river_value,
            lake_value,
            height,
            moisture,
        }
    }
}

fn classify(height: f64, moisture: f64) -> Biome {
    let (name, water) = if height < SEA_LEVEL {
        ("ocean", true)
    } else if height < SEA_LEVEL + 0.04 {
        ("beach", false)
    } else if height > MOUNTAIN_LEVEL {
        ("mountains", false)
    } else if moisture > 0.65 {
        ("swamp", false)
    } else if moisture > 0.45 {
        ("forest", false)
    } else if moisture > 0.25 {
        ("plains", false)
    } else {
        ("desert", false)
    };
    Biome {
        name: String::from(name),
        water,
    }
}

/// Lattice cell of `v` and the offset inside it in `[0, 1)`.
fn cell(v: i32, scale: i32) -> (i32, f64) {
    let index = v.checked_div_euclid(scale).unwrap_or(0);
    let offset = v.checked_rem_euclid(scale).unwrap_or(0);
    (index, f64::from(offset) / f64::from(scale.max(1)))
}

/// Uniform value in `[0, 1)` for a lattice point.
#[allow(clippy::cast_precision_loss)] // 53-bit value fits the f64 mantissa exactly
fn lattice(seed: u64, x: i32, y: i32) -> f64 {
    let xu = u64::from(u32::from_ne_bytes(x.to_ne_bytes()));
    let yu = u64::from(u32::from_ne_bytes(y.to_ne_bytes()));
    let h = splitmix(seed ^ splitmix(xu ^ splitmix(yu)));
    h.wrapping_shr(11) as f64 / TWO_POW_53
}

const fn splitmix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ z.wrapping_shr(30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ z.wrapping_shr(27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ z.wrapping_shr(31)
}

const fn smooth(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

const fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
