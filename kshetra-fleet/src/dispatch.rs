//! Task-to-robot assignment strategies.
//!
//! All three strategies consume the same planner-derived cost:
//!
//! - `path_distance`: edge count of the shortest path, with a large finite
//!   sentinel for unreachable pairs so reachable options always dominate;
//! - `path_cost = path_distance - 10 * priority`;
//! - `makespan_cost = path_distance / speed - 10 * priority`.
//!
//! `greedy` assigns one task at a time to the Euclidean-nearest free robot;
//! `optimal` and `balanced` build the full pairwise cost matrix and commit
//! pairs by ascending cost while both sides are still free (sorted-edge
//! matching). After committing, each pair is navigated in turn; one failed
//! navigation does not void the others.

use crate::board::TaskBoard;
use crate::core::GridPoint;
use crate::error::Result;
use crate::events::EventSink;
use crate::grid::OccupancyGrid;
use crate::planning::{Navigator, shortest_path};
use crate::robot::Robot;
use crate::task::{Task, TaskStatus};
use crate::world::World;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use yantra_modules::ModuleRegistry;

/// Cost charged for an unreachable (robot, task) pair. Large enough to
/// dominate any real path on supported grids without overflowing when the
/// matrix is converted to float.
pub const UNREACHABLE_PENALTY: i32 = 999_999;

/// Weight of one priority point against path distance.
const PRIORITY_WEIGHT: f32 = 10.0;

/// Assignment strategy selected by the ingress.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// One task at a time to the Euclidean-nearest free robot.
    Greedy,
    /// Min-sum matching on path cost.
    Optimal,
    /// Min-makespan matching on speed-scaled path cost.
    Balanced,
}

/// Edge count of the shortest path between two cells, or the unreachable
/// sentinel.
pub fn path_distance(grid: &OccupancyGrid, from: GridPoint, to: GridPoint) -> i32 {
    match shortest_path(grid, from, to) {
        Some(path) => path.len() as i32 - 1,
        None => UNREACHABLE_PENALTY,
    }
}

fn path_cost(grid: &OccupancyGrid, robot: &Robot, task: &Task) -> f32 {
    let distance = path_distance(grid, robot.grid_position(), task.target.to_grid());
    distance as f32 - PRIORITY_WEIGHT * task.priority as f32
}

fn makespan_cost(grid: &OccupancyGrid, robot: &Robot, task: &Task) -> f32 {
    let distance = path_distance(grid, robot.grid_position(), task.target.to_grid());
    let time_cost = if distance > 0 && robot.speed > 0.0 {
        distance as f32 / robot.speed
    } else {
        distance as f32
    };
    time_cost - PRIORITY_WEIGHT * task.priority as f32
}

/// Runs assignment strategies over one map's board and fleet.
pub struct Dispatcher<'a> {
    world: &'a mut World,
    board: &'a mut TaskBoard,
    events: &'a EventSink,
    registry: &'a ModuleRegistry,
}

impl<'a> Dispatcher<'a> {
    pub fn new(
        world: &'a mut World,
        board: &'a mut TaskBoard,
        events: &'a EventSink,
        registry: &'a ModuleRegistry,
    ) -> Self {
        Self { world, board, events, registry }
    }

    /// Run `strategy` to exhaustion and return the committed assignments.
    pub fn run(&mut self, strategy: Strategy) -> Result<HashMap<String, String>> {
        match strategy {
            Strategy::Greedy => self.assign_all_greedy(),
            Strategy::Optimal => self.assign_all_matched(path_cost),
            Strategy::Balanced => self.assign_all_matched(makespan_cost),
        }
    }

    /// A robot is available when its pose is finite and it has no active
    /// assignment on this board.
    fn available_robots(&self) -> Vec<Robot> {
        self.world
            .robots_on_map(self.board.map_id())
            .into_iter()
            .filter(|r| r.position.is_finite() && !self.board.is_robot_assigned(&r.id))
            .cloned()
            .collect()
    }

    /// Assign the head of the canonically-ordered pending queue to the
    /// Euclidean-nearest available robot, then navigate.
    ///
    /// Returns the committed (task id, robot id) pair, or `None` when there
    /// is nothing to assign (empty queue, invalid head target, or no free
    /// robot). In the latter cases the head task stays pending.
    pub fn assign_next_nearest(&mut self) -> Result<Option<(String, String)>> {
        self.board.sort_pending_canonical();
        let Some(task) = self.board.pending_tasks().into_iter().next() else {
            return Ok(None);
        };
        if !task.target.is_finite() {
            return Ok(None);
        }

        let nearest = self
            .available_robots()
            .into_iter()
            .min_by(|a, b| {
                let da = a.position.distance(&task.target);
                let db = b.position.distance(&task.target);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            });
        let Some(robot) = nearest else {
            debug!("no available robot for task {}", task.id);
            return Ok(None);
        };

        self.board.commit_assignment(&task.id, &robot.id)?;
        self.navigate_pair(&task.id, &robot.id);
        Ok(Some((task.id, robot.id)))
    }

    /// The greedy-all path: repeat [`assign_next_nearest`] until it makes
    /// no progress.
    ///
    /// [`assign_next_nearest`]: Dispatcher::assign_next_nearest
    fn assign_all_greedy(&mut self) -> Result<HashMap<String, String>> {
        let mut assignments = HashMap::new();
        while let Some((task_id, robot_id)) = self.assign_next_nearest()? {
            assignments.insert(task_id, robot_id);
        }
        Ok(assignments)
    }

    /// Sorted-edge matching over the full cost matrix, then commit and
    /// navigate every pair.
    fn assign_all_matched(
        &mut self,
        cost_fn: fn(&OccupancyGrid, &Robot, &Task) -> f32,
    ) -> Result<HashMap<String, String>> {
        let tasks = self.board.sorted_pending();
        let robots = self.available_robots();
        if tasks.is_empty() || robots.is_empty() {
            return Ok(HashMap::new());
        }

        let Some(map) = self.world.map(self.board.map_id()) else {
            return Ok(HashMap::new());
        };
        let grid = &map.grid;

        debug!(
            "building {}x{} cost matrix for board {}",
            tasks.len(),
            robots.len(),
            self.board.map_id()
        );
        let mut edges: Vec<(usize, usize, f32)> = Vec::with_capacity(tasks.len() * robots.len());
        for (ti, task) in tasks.iter().enumerate() {
            for (ri, robot) in robots.iter().enumerate() {
                edges.push((ti, ri, cost_fn(grid, robot, task)));
            }
        }
        edges.sort_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        let mut task_taken = vec![false; tasks.len()];
        let mut robot_taken = vec![false; robots.len()];
        let mut pairs = Vec::new();
        for (ti, ri, cost) in edges {
            if task_taken[ti] || robot_taken[ri] {
                continue;
            }
            task_taken[ti] = true;
            robot_taken[ri] = true;
            debug!(
                "matched task {} -> robot {} (cost={:.1})",
                tasks[ti].id, robots[ri].id, cost
            );
            pairs.push((tasks[ti].id.clone(), robots[ri].id.clone()));
        }

        let mut assignments = HashMap::new();
        for (task_id, robot_id) in &pairs {
            self.board.commit_assignment(task_id, robot_id)?;
            assignments.insert(task_id.clone(), robot_id.clone());
        }
        for (task_id, robot_id) in &pairs {
            self.navigate_pair(task_id, robot_id);
        }
        Ok(assignments)
    }

    /// Navigate one committed pair and record the task's terminal status.
    fn navigate_pair(&mut self, task_id: &str, robot_id: &str) {
        let Some(task) = self.board.get_task_by_id(task_id).cloned() else {
            return;
        };
        let map_id = self.board.map_id().to_owned();
        self.board.set_task_status(task_id, TaskStatus::InProgress);

        let Some((grid, robot)) = self.world.grid_and_robot_mut(&map_id, robot_id) else {
            warn!("cannot navigate: map {} or robot {} missing", map_id, robot_id);
            self.board.set_task_status(task_id, TaskStatus::Failed);
            return;
        };

        let navigator = Navigator::new(grid, self.events, self.registry);
        match navigator.navigate(robot, task.target, &task.id, &task.module_ids) {
            Ok(report) if report.completed => {
                self.board.set_task_status(task_id, TaskStatus::Completed);
            }
            Ok(_) => {
                self.board.set_task_status(task_id, TaskStatus::Failed);
            }
            Err(e) => {
                warn!("navigation failed for task {}: {}", task_id, e);
                self.board.set_task_status(task_id, TaskStatus::Failed);
            }
        }
    }
}
