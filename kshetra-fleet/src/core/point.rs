//! Coordinate types for the occupancy grid and the world plane.
//!
//! Robots live at real-valued [`Position`]s; the grid, the planner, and the
//! event log work in integer [`GridPoint`]s. A position snaps to its grid
//! cell by rounding each component.

use serde::{Deserialize, Serialize};

/// Grid cell coordinates (integer column/row indices).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridPoint {
    pub x: i32,
    pub y: i32,
}

impl GridPoint {
    #[inline]
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Manhattan distance to another cell.
    #[inline]
    pub fn manhattan_distance(&self, other: &GridPoint) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// The 4 cardinal neighbors in planner expansion order: +x, -x, +y, -y.
    ///
    /// The order is load-bearing: it is the tie-break between equal-cost
    /// neighbors during search, so the event stream is deterministic.
    #[inline]
    pub fn neighbors_4(&self) -> [GridPoint; 4] {
        [
            GridPoint::new(self.x + 1, self.y),
            GridPoint::new(self.x - 1, self.y),
            GridPoint::new(self.x, self.y + 1),
            GridPoint::new(self.x, self.y - 1),
        ]
    }
}

impl std::fmt::Display for GridPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

/// Real-valued position on the world plane.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    #[inline]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another position.
    #[inline]
    pub fn distance(&self, other: &Position) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Both components are finite (not NaN, not infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Snap to the nearest grid cell.
    #[inline]
    pub fn to_grid(&self) -> GridPoint {
        GridPoint::new(self.x.round() as i32, self.y.round() as i32)
    }
}
