//! # Kshetra-Fleet: Grid Fleet Control Plane
//!
//! A control plane for a fleet of grid-constrained mobile robots working on
//! rasterized 2D maps. It accepts task submissions (target positions with
//! priorities and post-arrival actions), assigns them to robots with
//! pathfinding-aware costs, executes the resulting navigation on the grid,
//! and records a structured event stream of every planning and movement
//! step. Post-arrival behaviors come from dynamically-loaded action modules
//! (see the `yantra-modules` crate).
//!
//! ## Quick Start
//!
//! ```rust
//! use kshetra_fleet::{EventSink, FleetController, Position, Robot, Strategy};
//!
//! let mut fleet = FleetController::new(EventSink::in_memory());
//! fleet.create_map("field", 20, 15, "north field", "").unwrap();
//!
//! let mut rover = Robot::new("r1", "Rover", Position::new(2.0, 2.0));
//! rover.map_id = "field".to_owned();
//! fleet.upsert_robot(rover).unwrap();
//!
//! fleet.create_task("field", Position::new(10.0, 8.0), 0, "", Vec::new()).unwrap();
//! let assignments = fleet.assign_tasks("field", Strategy::Greedy).unwrap();
//! assert_eq!(assignments.get("task-0").map(String::as_str), Some("r1"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//!   Ingress (HTTP, JSON, uploads; out of scope)
//!        │ typed operations
//!        ▼
//! ┌────────────────┐     ┌──────────────────┐
//! │ FleetController│────►│    TaskBoard     │  pending queue, id gen,
//! │  (controller)  │     │     (board)      │  assignment map
//! └───────┬────────┘     └────────┬─────────┘
//!         │                       │ canonical order
//!         ▼                       ▼
//! ┌────────────────┐     ┌──────────────────┐
//! │     World      │◄────│    Dispatcher    │  greedy / optimal / balanced
//! │ (maps, robots) │     │    (dispatch)    │  over planner-derived costs
//! └───────┬────────┘     └────────┬─────────┘
//!         │ grids                 │ per committed pair
//!         ▼                       ▼
//! ┌────────────────┐     ┌──────────────────┐     ┌────────────────┐
//! │ OccupancyGrid  │◄────│    Navigator     │────►│ ModuleRegistry │
//! │     (grid)     │     │    (planning)    │     │ (yantra crate) │
//! └────────────────┘     └────────┬─────────┘     └────────────────┘
//!                                 │ PLANNER_START, EXPAND, PUSH,
//!                                 ▼ PATH, MOVE_EXECUTED
//!                        ┌──────────────────┐
//!                        │    EventSink     │  timestamped line log
//!                        │     (events)     │
//!                        └──────────────────┘
//! ```
//!
//! ## Planning model
//!
//! Planning is Dijkstra on the 4-connected grid with uniform step cost 1
//! and stale-entry skipping; diagonal movement exists only as a robot
//! movement primitive and is never planned. Costs feed three assignment
//! strategies; execution replays the reconstructed path one grid step at a
//! time and invokes the task's action modules on arrival.
//!
//! ## Concurrency
//!
//! One dispatch request runs on one logical thread; the event sink and the
//! module registry are internally locked and shared freely. Controller
//! state (world, boards) is protected by the caller, typically behind a
//! single mutex in the ingress.

pub mod board;
pub mod config;
pub mod controller;
pub mod core;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod grid;
pub mod planning;
pub mod robot;
pub mod task;
pub mod world;

pub use board::TaskBoard;
pub use config::FleetConfig;
pub use controller::FleetController;
pub use core::{GridPoint, Position};
pub use dispatch::{Dispatcher, Strategy};
pub use error::{Error, Result, UnreachableReason};
pub use events::EventSink;
pub use grid::OccupancyGrid;
pub use planning::{NavigationReport, Navigator, shortest_path};
pub use robot::{Direction, Robot};
pub use task::{Task, TaskStatus};
pub use world::{MapRecord, World};
