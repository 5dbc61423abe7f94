//! Tile coordinates, chunk addressing, and compass directions.
//!
//! The world is an unbounded integer grid. Tiles are grouped into square
//! chunks of [`CHUNK_SIZE`] tiles per side; the realtime store keys data
//! first by chunk (`"cx,cy"`) and then by tile (`"x,y"`). Chunk indices use
//! floor division so negative coordinates land in the correct chunk.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Number of tiles along each side of a chunk.
pub const CHUNK_SIZE: i32 = 20;

/// An integer tile position on the world grid.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct TileCoord {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl TileCoord {
    /// Construct a coordinate.
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chunk index containing this tile.
    pub const fn chunk(self) -> (i32, i32) {
        (self.x.div_euclid(CHUNK_SIZE), self.y.div_euclid(CHUNK_SIZE))
    }

    /// Store key of the chunk containing this tile, e.g. `"0,-1"`.
    pub fn chunk_key(self) -> String {
        let (cx, cy) = self.chunk();
        format!("{cx},{cy}")
    }

    /// Store key of this tile inside its chunk, e.g. `"12,-3"`.
    pub fn tile_key(self) -> String {
        format!("{},{}", self.x, self.y)
    }

    /// Parse a tile key of the form `"x,y"`.
    pub fn parse_tile_key(key: &str) -> Option<Self> {
        let (x, y) = key.split_once(',')?;
        Some(Self::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
    }

    /// Euclidean distance to another tile.
    pub fn distance(self, other: Self) -> f64 {
        let dx = f64::from(other.x) - f64::from(self.x);
        let dy = f64::from(other.y) - f64::from(self.y);
        dx.hypot(dy)
    }

    /// Chebyshev (king-move) distance to another tile.
    pub fn chebyshev(self, other: Self) -> u32 {
        let dx = other.x.abs_diff(self.x);
        let dy = other.y.abs_diff(self.y);
        dx.max(dy)
    }

    /// Coordinate shifted by a delta, saturating at the grid bounds.
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x.saturating_add(dx), self.y.saturating_add(dy))
    }

    /// Neighbouring tile in the given compass direction.
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.offset(dx, dy)
    }

    /// The eight tiles surrounding this one, clockwise from north.
    pub fn neighbors(self) -> [Self; 8] {
        Direction::ALL.map(|d| self.step(d))
    }
}

impl core::fmt::Display for TileCoord {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One of the eight compass directions. North is negative `y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum Direction {
    /// Up.
    North,
    /// Up and right.
    NorthEast,
    /// Right.
    East,
    /// Down and right.
    SouthEast,
    /// Down.
    South,
    /// Down and left.
    SouthWest,
    /// Left.
    West,
    /// Up and left.
    NorthWest,
}

impl Direction {
    /// All directions, clockwise from north.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Grid delta for a single step.
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Position in [`Direction::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::North => 0,
            Self::NorthEast => 1,
            Self::East => 2,
            Self::SouthEast => 3,
            Self::South => 4,
            Self::SouthWest => 5,
            Self::West => 6,
            Self::NorthWest => 7,
        }
    }

    /// Direction at `index` modulo eight.
    pub const fn from_index(index: usize) -> Self {
        match index % 8 {
            0 => Self::North,
            1 => Self::NorthEast,
            2 => Self::East,
            3 => Self::SouthEast,
            4 => Self::South,
            5 => Self::SouthWest,
            6 => Self::West,
            _ => Self::NorthWest,
        }
    }

    /// Rotate by `steps` eighth-turns; positive is clockwise.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap, clippy::cast_sign_loss)] // index < 8 and rem_euclid(8) is in 0..8
    pub const fn rotate(self, steps: i32) -> Self {
        let shifted = (self.index() as i32).wrapping_add(steps).rem_euclid(8);
        Self::from_index(shifted as usize)
    }

    /// The nearest compass direction for a (non-zero) vector.
    ///
    /// Returns `None` for the zero vector.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // sector is in 0..=8
    pub fn from_vector(dx: f64, dy: f64) -> Option<Self> {
        if dx.abs() < f64::EPSILON && dy.abs() < f64::EPSILON {
            return None;
        }
        // atan2 with north = -y, measured clockwise.
        let angle = dx.atan2(-dy).to_degrees().rem_euclid(360.0);
        let sector = (angle / 45.0).round();
        Some(Self::from_index(sector as usize))
    }

    /// Unit vector (not normalised for diagonals) as floats.
    pub fn vector(self) -> (f64, f64) {
        let (dx, dy) = self.delta();
        (f64::from(dx), f64::from(dy))
    }
}
