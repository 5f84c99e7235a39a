//! Dispatch walkthrough: one map, two robots, a batch of prioritized
//! tasks, and the three assignment strategies side by side.
//!
//! Run with `RUST_LOG=debug` to watch the cost matrices being built.

use kshetra_fleet::{EventSink, FleetController, Position, Robot, Strategy};

fn main() -> kshetra_fleet::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut fleet = FleetController::new(EventSink::in_memory());

    // A 20x15 field with a wall across the middle.
    fleet.create_map("field", 20, 15, "demo field", "")?;
    {
        let grid = fleet.grid_mut("field")?;
        for x in 5..15 {
            grid.set(x, 7, 1)?;
        }
    }

    let mut rover = Robot::new("robot-1", "Rover", Position::new(2.0, 2.0));
    rover.map_id = "field".to_owned();
    fleet.upsert_robot(rover)?;

    let mut dasher = Robot::new("robot-2", "Dasher", Position::new(18.0, 12.0));
    dasher.speed = 1.5;
    dasher.map_id = "field".to_owned();
    fleet.upsert_robot(dasher)?;

    // Tasks with mixed priorities; higher dispatches earlier.
    let batch = [
        (Position::new(3.0, 5.0), 0),
        (Position::new(10.0, 8.0), 0),
        (Position::new(8.0, 10.0), 5),
        (Position::new(12.0, 2.0), 2),
    ];

    for strategy in [Strategy::Greedy, Strategy::Optimal, Strategy::Balanced] {
        // Fresh batch and free robots, so each strategy starts from the
        // same state.
        fleet.clear_all_assignments("field")?;
        for (target, priority) in batch {
            fleet.create_task("field", target, priority, "", Vec::new())?;
        }
        println!("pending tasks: {}", fleet.list_tasks("field")?.len());
        let assignments = fleet.assign_tasks("field", strategy)?;

        println!("--- {:?} ---", strategy);
        let mut pairs: Vec<_> = assignments.iter().collect();
        pairs.sort();
        for (task_id, robot_id) in pairs {
            println!("  {} -> {}", task_id, robot_id);
        }
    }

    println!("event log: {} lines", fleet.events()?.len());
    Ok(())
}
