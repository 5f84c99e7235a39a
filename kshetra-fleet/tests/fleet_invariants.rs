//! Cross-component invariants and idempotence properties, exercised
//! through the controller facade.

use kshetra_fleet::{
    Error, EventSink, FleetController, Position, Robot, Strategy, TaskStatus,
};

fn controller_with_field(width: usize, height: usize) -> FleetController {
    let mut fleet = FleetController::new(EventSink::in_memory());
    fleet.create_map("field", width, height, "field", "").unwrap();
    fleet
}

fn placed_robot(id: &str, x: f32, y: f32) -> Robot {
    let mut robot = Robot::new(id, id, Position::new(x, y));
    robot.map_id = "field".to_owned();
    robot
}

// Every robot with a map id is in that map's membership list, and dispatch
// never double-books either side of an assignment.
#[test]
fn test_membership_and_assignment_uniqueness() {
    let mut fleet = controller_with_field(10, 10);
    for (id, x) in [("r1", 0.0), ("r2", 4.0), ("r3", 9.0)] {
        fleet.upsert_robot(placed_robot(id, x, 0.0)).unwrap();
    }
    for x in [1.0, 5.0, 8.0, 2.0, 7.0] {
        fleet.create_task("field", Position::new(x, 3.0), 0, "", Vec::new()).unwrap();
    }

    let assignments = fleet.assign_tasks("field", Strategy::Optimal).unwrap();

    // Three robots, five tasks: exactly three pairs, no duplicates.
    assert_eq!(assignments.len(), 3);
    let mut robots: Vec<&String> = assignments.values().collect();
    robots.sort();
    robots.dedup();
    assert_eq!(robots.len(), 3);

    for (task_id, robot_id) in &assignments {
        assert!(fleet.get_task("field", task_id).unwrap().is_some());
        assert!(fleet.robot(robot_id).is_some());
    }

    let map = fleet.map("field").unwrap();
    for robot_id in map.robot_ids() {
        assert_eq!(fleet.robot(robot_id).unwrap().map_id, "field");
    }
}

// Deleting a map removes its robots and its whole task board.
#[test]
fn test_map_deletion_cascade() {
    let mut fleet = controller_with_field(5, 5);
    fleet.upsert_robot(placed_robot("r1", 0.0, 0.0)).unwrap();
    fleet.create_task("field", Position::new(2.0, 2.0), 0, "", Vec::new()).unwrap();

    fleet.delete_map("field").unwrap();

    assert!(fleet.robot("r1").is_none());
    assert!(matches!(fleet.list_tasks("field"), Err(Error::NotFound(_))));
    assert!(matches!(fleet.delete_map("field"), Err(Error::NotFound(_))));
}

// A pathfind to the robot's own cell is a complete no-op on world state.
#[test]
fn test_same_cell_pathfind_is_idempotent() {
    let mut fleet = controller_with_field(5, 5);
    fleet.upsert_robot(placed_robot("r1", 3.0, 3.0)).unwrap();

    let report = fleet.pathfind("r1", "field", Position::new(3.0, 3.0)).unwrap();

    assert_eq!(report.path.len(), 1);
    assert_eq!(report.steps_executed, 0);
    assert!(report.completed);
    assert_eq!(fleet.robot("r1").unwrap().position, Position::new(3.0, 3.0));

    let lines = fleet.events().unwrap();
    assert_eq!(lines.len(), 2); // PLANNER_START + PATH
    assert!(lines[1].contains("size=1"));
}

// Stale assignments block robots; clearing them restores the result a
// fresh dispatch over the same pending set would produce.
#[test]
fn test_clear_assignments_restores_fresh_dispatch() {
    // Fleet whose robot is still booked from a previous simulation.
    let mut stale = controller_with_field(10, 10);
    stale.upsert_robot(placed_robot("r1", 0.0, 0.0)).unwrap();
    stale.create_task("field", Position::new(4.0, 0.0), 0, "", Vec::new()).unwrap();
    stale.assign_tasks("field", Strategy::Greedy).unwrap();

    let pending = stale
        .create_task("field", Position::new(4.0, 4.0), 0, "", Vec::new())
        .unwrap()
        .unwrap();
    assert!(stale.assign_tasks("field", Strategy::Greedy).unwrap().is_empty());

    stale.clear_all_assignments("field").unwrap();
    let after_clear = stale.assign_tasks("field", Strategy::Greedy).unwrap();

    // Fleet with identical inputs and no stale bookings.
    let mut fresh = controller_with_field(10, 10);
    fresh.upsert_robot(placed_robot("r1", 4.0, 0.0)).unwrap();
    let fresh_task = fresh
        .create_task("field", Position::new(4.0, 4.0), 0, "", Vec::new())
        .unwrap()
        .unwrap();
    let fresh_result = fresh.assign_tasks("field", Strategy::Greedy).unwrap();

    assert_eq!(after_clear.get(&pending).unwrap(), "r1");
    assert_eq!(fresh_result.get(&fresh_task).unwrap(), "r1");
    assert_eq!(stale.robot("r1").unwrap().position, Position::new(4.0, 4.0));
    assert_eq!(fresh.robot("r1").unwrap().position, Position::new(4.0, 4.0));
}

// Robot entity survives a serialize/deserialize round trip.
#[test]
fn test_robot_round_trip_via_json() {
    let mut robot = placed_robot("r9", 6.5, -1.25);
    robot.kind = "waterer".to_owned();
    robot.max_distance = 12.0;

    let json = serde_json::to_string(&robot).unwrap();
    let back: Robot = serde_json::from_str(&json).unwrap();

    assert_eq!(back.id, robot.id);
    assert_eq!(back.name, robot.name);
    assert_eq!(back.position.x, robot.position.x);
    assert_eq!(back.position.y, robot.position.y);
    assert_eq!(back.map_id, "field");
}

// Task lifecycle surfaces through the board records after dispatch.
#[test]
fn test_task_terminal_status_after_dispatch() {
    let mut fleet = controller_with_field(6, 6);
    fleet.upsert_robot(placed_robot("r1", 0.0, 0.0)).unwrap();
    let task_id = fleet
        .create_task("field", Position::new(5.0, 5.0), 0, "", Vec::new())
        .unwrap()
        .unwrap();

    fleet.assign_tasks("field", Strategy::Greedy).unwrap();

    let task = fleet.get_task("field", &task_id).unwrap().unwrap();
    assert_eq!(task.status, TaskStatus::Completed);
    assert!(fleet.list_tasks("field").unwrap().is_empty());
}
