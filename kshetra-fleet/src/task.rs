//! Task records and their lifecycle states.

use crate::core::Position;
use serde::{Deserialize, Serialize};

/// Lifecycle of a task.
///
/// Created `Pending` on the board, `Assigned` when the dispatcher commits
/// it to a robot, `InProgress` while the planner navigates, and finally
/// `Completed` (arrival plus module invocation) or `Failed`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Assigned,
    InProgress,
    Completed,
    Failed,
}

/// A unit of work at a target position on one map.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Task {
    /// Unique within the owning board.
    pub id: String,
    #[serde(default)]
    pub description: String,
    /// Where a robot has to go. Must be finite and a valid cell of the
    /// owning map.
    pub target: Position,
    /// Higher priority dispatches earlier.
    #[serde(default)]
    pub priority: i32,
    #[serde(default = "pending")]
    pub status: TaskStatus,
    /// Action modules to invoke after arrival, in declared order.
    #[serde(default)]
    pub module_ids: Vec<String>,
}

fn pending() -> TaskStatus {
    TaskStatus::Pending
}

impl Task {
    pub fn new(id: impl Into<String>, target: Position) -> Self {
        Self {
            id: id.into(),
            description: String::new(),
            target,
            priority: 0,
            status: TaskStatus::Pending,
            module_ids: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_task_is_pending() {
        let task = Task::new("task-0", Position::new(2.0, 3.0));
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, 0);
        assert!(task.module_ids.is_empty());
    }

    #[test]
    fn test_serde_defaults() {
        let json = r#"{"id":"task-1","target":{"x":1.0,"y":2.0}}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.priority, 0);
        assert!(task.description.is_empty());
    }
}
