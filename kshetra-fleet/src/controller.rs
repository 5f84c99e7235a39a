//! Typed operation surface consumed by the ingress.
//!
//! The controller owns the world, the per-map task boards, the event sink,
//! and the module host, and exposes the operations the request handlers
//! dispatch to. HTTP, JSON bodies, and uploads stay outside; everything
//! here takes and returns typed values.

use crate::board::TaskBoard;
use crate::config::FleetConfig;
use crate::core::Position;
use crate::dispatch::{Dispatcher, Strategy};
use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::grid::OccupancyGrid;
use crate::planning::{NavigationReport, Navigator};
use crate::robot::Robot;
use crate::task::Task;
use crate::world::{MapRecord, World};
use log::info;
use std::collections::HashMap;
use std::path::Path;
use yantra_modules::{ModuleDescriptor, ModuleHost, ModuleRegistry};

/// The control plane for one robot fleet.
pub struct FleetController {
    world: World,
    boards: HashMap<String, TaskBoard>,
    events: EventSink,
    host: ModuleHost,
    next_robot_id: u64,
}

impl FleetController {
    /// Controller writing events to the given sink.
    pub fn new(events: EventSink) -> Self {
        Self {
            world: World::new(),
            boards: HashMap::new(),
            events,
            host: ModuleHost::new(),
            next_robot_id: 0,
        }
    }

    /// Controller configured from a [`FleetConfig`]: file-backed event sink,
    /// modules loaded from the configured directory, enabled set applied.
    pub fn with_config(config: &FleetConfig) -> Result<Self> {
        let mut controller = Self::new(EventSink::to_file(&config.events.path)?);
        if !config.modules.directory.is_empty() {
            let dir = Path::new(&config.modules.directory);
            if dir.is_dir() {
                let loaded = controller.host.load_directory(dir)?;
                info!("loaded {} modules from {}", loaded, dir.display());
            }
        }
        controller
            .host
            .set_enabled(config.modules.enabled.iter().cloned());
        Ok(controller)
    }

    // === Maps ===

    /// Create a map with an all-accessible grid and an empty task board.
    pub fn create_map(
        &mut self,
        id: &str,
        width: usize,
        height: usize,
        name: &str,
        map_url: &str,
    ) -> Result<()> {
        let grid = OccupancyGrid::new(width, height)?;
        self.world.add_map(MapRecord::new(id, name, map_url, grid));
        self.boards.insert(id.to_owned(), TaskBoard::new(id));
        info!("created map {} ({}x{})", id, width, height);
        Ok(())
    }

    /// Delete a map, its robots (cascade), and its task board.
    pub fn delete_map(&mut self, id: &str) -> Result<()> {
        self.world
            .remove_map(id)
            .ok_or_else(|| Error::NotFound(format!("map {}", id)))?;
        self.boards.remove(id);
        Ok(())
    }

    pub fn map(&self, id: &str) -> Option<&MapRecord> {
        self.world.map(id)
    }

    /// Mutable grid access for the segmentation ingress.
    pub fn grid_mut(&mut self, map_id: &str) -> Result<&mut OccupancyGrid> {
        self.world
            .map_mut(map_id)
            .map(|m| &mut m.grid)
            .ok_or_else(|| Error::NotFound(format!("map {}", map_id)))
    }

    // === Robots ===

    /// Insert or replace a robot. An empty id gets a generated one; the
    /// position must be finite. Returns the robot's id.
    pub fn upsert_robot(&mut self, mut robot: Robot) -> Result<String> {
        if !robot.position.is_finite() {
            return Err(Error::InvalidArgument("robot position must be finite".to_owned()));
        }
        if robot.id.is_empty() {
            robot.id = format!("robot-{}", self.next_robot_id);
            self.next_robot_id += 1;
        }
        let id = robot.id.clone();
        self.world.upsert_robot(robot)?;
        Ok(id)
    }

    pub fn patch_robot_position(&mut self, id: &str, x: f32, y: f32) -> Result<()> {
        self.world.set_robot_position(id, x, y)
    }

    pub fn delete_robot(&mut self, id: &str) -> Result<()> {
        self.world
            .remove_robot(id)
            .map(|_| ())
            .ok_or_else(|| Error::NotFound(format!("robot {}", id)))
    }

    pub fn robot(&self, id: &str) -> Option<&Robot> {
        self.world.robot(id)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    // === Tasks ===

    /// Append a task to a map's board. Non-finite targets are silently
    /// dropped; the id of the created task is returned otherwise.
    pub fn create_task(
        &mut self,
        map_id: &str,
        target: Position,
        priority: i32,
        description: &str,
        module_ids: Vec<String>,
    ) -> Result<Option<String>> {
        let board = self.board_mut(map_id)?;
        Ok(board.add_task_at(target, priority, description, module_ids))
    }

    /// Snapshot of a map's pending tasks.
    pub fn list_tasks(&self, map_id: &str) -> Result<Vec<Task>> {
        Ok(self.board(map_id)?.pending_tasks())
    }

    pub fn get_task(&self, map_id: &str, task_id: &str) -> Result<Option<Task>> {
        Ok(self.board(map_id)?.get_task_by_id(task_id).cloned())
    }

    /// Run an assignment strategy on a map's board, committing assignments
    /// and navigating every committed pair before returning.
    pub fn assign_tasks(
        &mut self,
        map_id: &str,
        strategy: Strategy,
    ) -> Result<HashMap<String, String>> {
        let board = self
            .boards
            .get_mut(map_id)
            .ok_or_else(|| Error::NotFound(format!("task board for map {}", map_id)))?;
        let mut dispatcher =
            Dispatcher::new(&mut self.world, board, &self.events, ModuleRegistry::global());
        dispatcher.run(strategy)
    }

    /// Snapshot of a map's active assignments.
    pub fn get_assignments(&self, map_id: &str) -> Result<HashMap<String, String>> {
        Ok(self.board(map_id)?.assignments().clone())
    }

    /// Drop a finished task's assignment record.
    pub fn mark_task_complete(&mut self, map_id: &str, task_id: &str) -> Result<()> {
        self.board_mut(map_id)?.mark_complete(task_id);
        Ok(())
    }

    /// Drop all active assignments on a map, freeing its robots for a fresh
    /// dispatch.
    pub fn clear_all_assignments(&mut self, map_id: &str) -> Result<()> {
        self.board_mut(map_id)?.clear_all_assignments();
        Ok(())
    }

    // === Navigation ===

    /// Clear the simulation log and run the planner once for one robot.
    /// No task is involved, so no modules are invoked.
    pub fn pathfind(
        &mut self,
        robot_id: &str,
        map_id: &str,
        target: Position,
    ) -> Result<NavigationReport> {
        self.events.clear()?;
        let (grid, robot) = self
            .world
            .grid_and_robot_mut(map_id, robot_id)
            .ok_or_else(|| Error::NotFound(format!("robot {} on map {}", robot_id, map_id)))?;
        let navigator = Navigator::new(grid, &self.events, ModuleRegistry::global());
        navigator.navigate(robot, target, robot_id, &[])
    }

    // === Modules ===

    /// Load every artifact in `dir`. Returns the number loaded.
    pub fn load_modules(&mut self, dir: &Path) -> Result<usize> {
        Ok(self.host.load_directory(dir)?)
    }

    pub fn list_modules(&self) -> Vec<ModuleDescriptor> {
        self.host.descriptors()
    }

    /// Replace the enabled-module set.
    pub fn set_enabled_modules(&mut self, ids: Vec<String>) {
        self.host.set_enabled(ids);
    }

    /// Invoke a module on behalf of the ingress. `Ok(false)` means the
    /// module is disabled and the request was dropped.
    pub fn invoke_module(&self, id: &str, context: &str) -> Result<bool> {
        Ok(self.host.invoke(id, context)?)
    }

    // === Events ===

    /// Snapshot of the simulation event log.
    pub fn events(&self) -> Result<Vec<String>> {
        self.events.lines()
    }

    /// Truncate the simulation event log.
    pub fn clear_events(&self) -> Result<()> {
        self.events.clear()
    }

    fn board(&self, map_id: &str) -> Result<&TaskBoard> {
        self.boards
            .get(map_id)
            .ok_or_else(|| Error::NotFound(format!("task board for map {}", map_id)))
    }

    fn board_mut(&mut self, map_id: &str) -> Result<&mut TaskBoard> {
        self.boards
            .get_mut(map_id)
            .ok_or_else(|| Error::NotFound(format!("task board for map {}", map_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> FleetController {
        FleetController::new(EventSink::in_memory())
    }

    #[test]
    fn test_create_map_creates_board() {
        let mut c = controller();
        c.create_map("m1", 5, 5, "field", "http://maps/field.png").unwrap();
        assert!(c.map("m1").is_some());
        assert!(c.list_tasks("m1").unwrap().is_empty());
    }

    #[test]
    fn test_create_map_rejects_zero_dimension() {
        let mut c = controller();
        assert!(matches!(
            c.create_map("m1", 0, 5, "", ""),
            Err(Error::InvalidArgument(_))
        ));
        assert!(c.map("m1").is_none());
    }

    #[test]
    fn test_delete_map_cascades() {
        let mut c = controller();
        c.create_map("m1", 5, 5, "", "").unwrap();
        let mut robot = Robot::new("r1", "Rover", Position::new(1.0, 1.0));
        robot.map_id = "m1".to_owned();
        c.upsert_robot(robot).unwrap();
        c.create_task("m1", Position::new(2.0, 2.0), 0, "", Vec::new()).unwrap();

        c.delete_map("m1").unwrap();
        assert!(c.robot("r1").is_none());
        assert!(matches!(c.list_tasks("m1"), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_upsert_robot_generates_id() {
        let mut c = controller();
        let id = c.upsert_robot(Robot::new("", "anon", Position::new(0.0, 0.0))).unwrap();
        assert_eq!(id, "robot-0");
        assert!(c.robot("robot-0").is_some());
    }

    #[test]
    fn test_upsert_robot_rejects_non_finite_position() {
        let mut c = controller();
        let robot = Robot::new("r1", "Rover", Position::new(f32::NAN, 0.0));
        assert!(matches!(c.upsert_robot(robot), Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_pathfind_clears_log_first() {
        let mut c = controller();
        c.create_map("m1", 5, 5, "", "").unwrap();
        let mut robot = Robot::new("r1", "Rover", Position::new(0.0, 0.0));
        robot.map_id = "m1".to_owned();
        c.upsert_robot(robot).unwrap();

        c.events.log("stale line");
        let report = c.pathfind("r1", "m1", Position::new(2.0, 0.0)).unwrap();
        assert!(report.completed);

        let lines = c.events().unwrap();
        assert!(!lines.iter().any(|l| l.contains("stale line")));
        assert!(lines[0].contains("PLANNER_START"));
    }

    #[test]
    fn test_pathfind_unknown_robot() {
        let mut c = controller();
        c.create_map("m1", 5, 5, "", "").unwrap();
        assert!(matches!(
            c.pathfind("ghost", "m1", Position::new(1.0, 1.0)),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_assign_tasks_end_to_end() {
        let mut c = controller();
        c.create_map("m1", 6, 6, "", "").unwrap();
        let mut robot = Robot::new("r1", "Rover", Position::new(0.0, 0.0));
        robot.map_id = "m1".to_owned();
        c.upsert_robot(robot).unwrap();
        c.create_task("m1", Position::new(3.0, 3.0), 0, "", Vec::new()).unwrap();

        let assignments = c.assign_tasks("m1", Strategy::Greedy).unwrap();
        assert_eq!(assignments.get("task-0").unwrap(), "r1");
        assert_eq!(c.robot("r1").unwrap().position, Position::new(3.0, 3.0));
        assert_eq!(c.get_assignments("m1").unwrap().len(), 1);

        c.mark_task_complete("m1", "task-0").unwrap();
        assert!(c.get_assignments("m1").unwrap().is_empty());
    }
}
