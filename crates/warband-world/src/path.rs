//! Terrain-constrained line pathing.
//!
//! Paths are short Bresenham walks bounded by a step budget. The walk stops
//! at the first cell the group cannot enter and reports it; it never skips
//! over incompatible terrain. Callers decide whether to pick an alternate
//! cell or wander instead.

use warband_types::TileCoord;

use crate::mobility::Mobility;
use crate::terrain::TerrainOracle;

/// Result of [`compute_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathResult {
    /// Waypoints starting with the start tile.
    pub points: Vec<TileCoord>,
    /// Whether the walk stopped at incompatible terrain.
    pub blocked: bool,
    /// The incompatible cell, when blocked.
    pub blocked_at: Option<TileCoord>,
}

impl PathResult {
    /// Last reachable waypoint.
    pub fn end(&self) -> Option<TileCoord> {
        self.points.last().copied()
    }

    /// Number of steps taken (waypoints minus the start).
    pub fn steps(&self) -> usize {
        self.points.len().saturating_sub(1)
    }
}

/// Walk from `start` toward `end` for at most
/// `min(max_steps, chebyshev(start, end))` steps.
///
/// `start == end` yields `[start]` and is never blocked.
pub fn compute_path(
    start: TileCoord,
    end: TileCoord,
    max_steps: u32,
    mobility: Mobility,
    terrain: &dyn TerrainOracle,
) -> PathResult {
    let budget = max_steps.min(start.chebyshev(end));
    let mut points = Vec::with_capacity(usize::try_from(budget).unwrap_or(0).saturating_add(1));
    points.push(start);

    let mut walker = LineWalker::new(start, end);
    for _ in 0..budget {
        let Some(next) = walker.next() else {
            break;
        };
        if !mobility.can_enter(terrain, next) {
            return PathResult {
                points,
                blocked: true,
                blocked_at: Some(next),
            };
        }
        points.push(next);
    }

    PathResult {
        points,
        blocked: false,
        blocked_at: None,
    }
}

/// Integer Bresenham line iterator yielding each cell after the start.
struct LineWalker {
    x: i64,
    y: i64,
    end_x: i64,
    end_y: i64,
    dx: i64,
    dy: i64,
    sx: i64,
    sy: i64,
    err: i64,
}

impl LineWalker {
    fn new(start: TileCoord, end: TileCoord) -> Self {
        let (x, y) = (i64::from(start.x), i64::from(start.y));
        let (end_x, end_y) = (i64::from(end.x), i64::from(end.y));
        let dx = end_x.saturating_sub(x).abs();
        let dy = end_y.saturating_sub(y).abs().saturating_neg();
        Self {
            x,
            y,
            end_x,
            end_y,
            dx,
            dy,
            sx: if x < end_x { 1 } else { -1 },
            sy: if y < end_y { 1 } else { -1 },
            err: dx.saturating_add(dy),
        }
    }
}

impl Iterator for LineWalker {
    type Item = TileCoord;

    fn next(&mut self) -> Option<TileCoord> {
        if self.x == self.end_x && self.y == self.end_y {
            return None;
        }
        let e2 = self.err.saturating_mul(2);
        if e2 >= self.dy {
            self.err = self.err.saturating_add(self.dy);
            self.x = self.x.saturating_add(self.sx);
        }
        if e2 <= self.dx {
            self.err = self.err.saturating_add(self.dx);
            self.y = self.y.saturating_add(self.sy);
        }
        Some(TileCoord::new(
            i32::try_from(self.x).ok()?,
            i32::try_from(self.y).ok()?,
        ))
    }
}
