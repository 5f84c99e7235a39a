//! Navigation: plan, execute, and report.
//!
//! The navigator runs one robot to one target: it validates the request,
//! searches, emits the event stream (`PLANNER_START`, `EXPAND`/`PUSH`,
//! `PATH`, `MOVE_EXECUTED` per step), and on arrival invokes the task's
//! action modules in declared order with the task id as context.

use crate::core::{GridPoint, Position};
use crate::error::{Error, Result, UnreachableReason};
use crate::events::EventSink;
use crate::grid::OccupancyGrid;
use crate::planning::{SearchStep, search};
use crate::robot::Robot;
use log::{debug, warn};
use yantra_modules::ModuleRegistry;

/// Outcome of one navigation run.
#[derive(Clone, Debug)]
pub struct NavigationReport {
    /// Reconstructed path, endpoints inclusive. Length 1 means the robot
    /// already stood on the target.
    pub path: Vec<GridPoint>,
    /// Grid steps actually applied to the robot.
    pub steps_executed: usize,
    /// The robot reached the target and post-arrival modules ran.
    pub completed: bool,
}

/// Executes navigation for robots on one grid.
pub struct Navigator<'a> {
    grid: &'a OccupancyGrid,
    events: &'a EventSink,
    registry: &'a ModuleRegistry,
}

impl<'a> Navigator<'a> {
    pub fn new(grid: &'a OccupancyGrid, events: &'a EventSink, registry: &'a ModuleRegistry) -> Self {
        Self { grid, events, registry }
    }

    /// Navigate `robot` to `target`, then invoke `module_ids` with
    /// `context` (the task id) after arrival.
    ///
    /// Preconditions are checked in order before anything is emitted:
    /// target in bounds, target accessible, start accessible. A target equal
    /// to the start yields the trivial single-cell path (no movement, but
    /// arrival semantics: the `PATH` event and module invocations still
    /// happen).
    ///
    /// Execution stops at the first failed step, leaving the robot on its
    /// last successful cell; modules are only invoked after a complete run.
    pub fn navigate(
        &self,
        robot: &mut Robot,
        target: Position,
        context: &str,
        module_ids: &[String],
    ) -> Result<NavigationReport> {
        let start = robot.grid_position();
        let goal = target.to_grid();

        if !self.grid.is_valid_position(goal.x, goal.y) {
            return Err(Error::Unreachable(UnreachableReason::OutOfBounds));
        }
        if !self.grid.is_accessible_point(goal) {
            return Err(Error::Unreachable(UnreachableReason::Blocked));
        }
        if !self.grid.is_accessible_point(start) {
            return Err(Error::Unreachable(UnreachableReason::StartBlocked));
        }

        self.events.log_planner_start(
            &robot.id,
            &robot.name,
            start,
            goal,
            self.grid.width(),
            self.grid.height(),
        );

        let path = search(self.grid, start, goal, |step| match step {
            SearchStep::Expand { node, cost, parent } => {
                self.events.log_expand(&robot.id, node, cost, parent)
            }
            SearchStep::Push { node, cost } => self.events.log_push(&robot.id, node, cost),
        })
        .ok_or(Error::Unreachable(UnreachableReason::NoPath))?;

        self.events.log_path(&robot.id, &path);
        debug!(
            "robot {} path {} -> {} ({} cells)",
            robot.id,
            start,
            goal,
            path.len()
        );

        let mut steps_executed = 0;
        let mut completed = true;
        for step in &path[1..] {
            if !robot.move_to_grid(step.x, step.y, self.grid) {
                warn!(
                    "robot {} stopped at {}: step to {} no longer valid",
                    robot.id,
                    robot.grid_position(),
                    step
                );
                completed = false;
                break;
            }
            self.events.log_move_executed(&robot.id, *step);
            steps_executed += 1;
        }

        if completed {
            for module_id in module_ids {
                if !self.registry.invoke(module_id, context) {
                    warn!("module {} not registered; skipping invocation", module_id);
                }
            }
        }

        Ok(NavigationReport { path, steps_executed, completed })
    }
}
