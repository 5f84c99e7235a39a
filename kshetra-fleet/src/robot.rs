//! Robot identity, pose, and grid-snapped movement primitives.
//!
//! A robot holds a real-valued pose but moves on the occupancy grid: every
//! move is validated against cell accessibility (at the floor of the target
//! coordinates) and, when `max_distance` is set, against the robot's travel
//! range. Failed moves leave the pose unchanged.

use crate::core::{GridPoint, Position};
use crate::grid::OccupancyGrid;
use serde::{Deserialize, Serialize};

/// The eight compass directions for unit-step movement.
///
/// `Up` is -y: maps are rasterized images, so y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    UpLeft,
    UpRight,
    DownLeft,
    DownRight,
}

impl Direction {
    /// Unit step for this direction as (dx, dy).
    pub fn step(&self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
            Direction::UpLeft => (-1.0, -1.0),
            Direction::UpRight => (1.0, -1.0),
            Direction::DownLeft => (-1.0, 1.0),
            Direction::DownRight => (1.0, 1.0),
        }
    }
}

/// A mobile agent on one map of the world.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Robot {
    /// Process-wide unique id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Free-form kind tag ("harvester", "waterer", ...).
    #[serde(default)]
    pub kind: String,
    /// Free-form attribute blob.
    #[serde(default)]
    pub attributes: String,
    /// Current pose on the world plane.
    pub position: Position,
    /// Movement speed, cells per time unit. Used by makespan costing.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Maximum travel distance per move; 0 means unbounded.
    #[serde(default)]
    pub max_distance: f32,
    /// Id of the map this robot inhabits; empty means unplaced.
    #[serde(default)]
    pub map_id: String,
}

fn default_speed() -> f32 {
    1.0
}

impl Robot {
    pub fn new(id: impl Into<String>, name: impl Into<String>, position: Position) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: String::new(),
            attributes: String::new(),
            position,
            speed: default_speed(),
            max_distance: 0.0,
            map_id: String::new(),
        }
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.position = Position::new(x, y);
    }

    /// Grid cell this robot occupies: (round(x), round(y)).
    pub fn grid_position(&self) -> GridPoint {
        self.position.to_grid()
    }

    /// Whether the robot may move to (x, y) on `grid`.
    ///
    /// The target cell (floor of the coordinates) must be in bounds and
    /// accessible; if `max_distance` is set, the Euclidean distance from the
    /// current pose must not exceed it.
    pub fn can_move_to(&self, x: f32, y: f32, grid: &OccupancyGrid) -> bool {
        if x < 0.0 || x >= grid.width() as f32 || y < 0.0 || y >= grid.height() as f32 {
            return false;
        }
        if !grid.is_accessible(x.floor() as i32, y.floor() as i32) {
            return false;
        }
        if self.max_distance > 0.0 {
            let distance = self.position.distance(&Position::new(x, y));
            if distance > self.max_distance {
                return false;
            }
        }
        true
    }

    /// Move to (x, y) if permitted. Returns false (pose unchanged) otherwise.
    pub fn move_to(&mut self, x: f32, y: f32, grid: &OccupancyGrid) -> bool {
        if self.can_move_to(x, y, grid) {
            self.set_position(x, y);
            true
        } else {
            false
        }
    }

    /// Move by a relative offset.
    pub fn move_by(&mut self, dx: f32, dy: f32, grid: &OccupancyGrid) -> bool {
        self.move_to(self.position.x + dx, self.position.y + dy, grid)
    }

    /// Take a unit step in a compass direction.
    pub fn move_in_direction(&mut self, dir: Direction, grid: &OccupancyGrid) -> bool {
        let (dx, dy) = dir.step();
        self.move_by(dx, dy, grid)
    }

    /// Move to an integer grid cell.
    pub fn move_to_grid(&mut self, grid_x: i32, grid_y: i32, grid: &OccupancyGrid) -> bool {
        self.move_to(grid_x as f32, grid_y as f32, grid)
    }
}
