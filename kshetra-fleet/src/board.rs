//! Per-map task board: pending queue, assignment map, id generation.
//!
//! The board never decides who does what; the dispatcher does. The board
//! owns the tasks, hands out snapshots in the canonical dispatch order
//! (priority descending, id ascending), and records which task is committed
//! to which robot.

use crate::core::Position;
use crate::error::{Error, Result};
use crate::task::{Task, TaskStatus};
use log::debug;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Canonical dispatch order: priority descending, then id ascending.
///
/// Ids compare lexicographically; the ordering is stable across calls.
pub fn canonical_cmp(a: &Task, b: &Task) -> Ordering {
    b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id))
}

/// Task queue and assignment bookkeeping for one map.
pub struct TaskBoard {
    map_id: String,
    pending: Vec<Task>,
    /// Tasks that left the pending queue (Assigned and beyond), by id.
    records: HashMap<String, Task>,
    /// task id -> robot id, for active assignments.
    assignments: HashMap<String, String>,
    next_task_id: u64,
}

impl TaskBoard {
    pub fn new(map_id: impl Into<String>) -> Self {
        Self {
            map_id: map_id.into(),
            pending: Vec::new(),
            records: HashMap::new(),
            assignments: HashMap::new(),
            next_task_id: 0,
        }
    }

    pub fn map_id(&self) -> &str {
        &self.map_id
    }

    /// Next unique task id on this board: `task-0`, `task-1`, ...
    pub fn generate_task_id(&mut self) -> String {
        let id = format!("task-{}", self.next_task_id);
        self.next_task_id += 1;
        id
    }

    /// Append a pending task at `target`.
    ///
    /// Non-finite targets are silently dropped (the ingress feeds unchecked
    /// coordinates through here). An empty description is replaced with a
    /// generated one. Returns the task id when a task was created.
    pub fn add_task_at(
        &mut self,
        target: Position,
        priority: i32,
        description: &str,
        module_ids: Vec<String>,
    ) -> Option<String> {
        if !target.is_finite() {
            debug!("dropping task with non-finite target on board {}", self.map_id);
            return None;
        }

        let id = self.generate_task_id();
        let description = if description.is_empty() {
            format!("Task at ({}, {})", target.x, target.y)
        } else {
            description.to_owned()
        };

        self.pending.push(Task {
            id: id.clone(),
            description,
            target,
            priority,
            status: TaskStatus::Pending,
            module_ids,
        });
        Some(id)
    }

    /// Append a pre-constructed task. The caller is responsible for id
    /// uniqueness.
    pub fn add_task(&mut self, task: Task) {
        self.pending.push(task);
    }

    /// Batch form of [`add_task_at`](TaskBoard::add_task_at) with default
    /// descriptions and no modules.
    pub fn add_tasks(&mut self, targets: &[(Position, i32)]) {
        for (target, priority) in targets {
            self.add_task_at(*target, *priority, "", Vec::new());
        }
    }

    /// Snapshot of the pending queue, in insertion order.
    pub fn pending_tasks(&self) -> Vec<Task> {
        self.pending.clone()
    }

    /// Snapshot of the pending queue in canonical dispatch order.
    pub fn sorted_pending(&self) -> Vec<Task> {
        let mut tasks = self.pending.clone();
        tasks.sort_by(canonical_cmp);
        tasks
    }

    /// Sort the pending queue in place (the greedy strategy pops its head).
    pub(crate) fn sort_pending_canonical(&mut self) {
        self.pending.sort_by(canonical_cmp);
    }

    /// Look up a task by id, pending first, then committed records.
    pub fn get_task_by_id(&self, task_id: &str) -> Option<&Task> {
        self.pending
            .iter()
            .find(|t| t.id == task_id)
            .or_else(|| self.records.get(task_id))
    }

    /// Commit `task_id` to `robot_id`: the task leaves the pending queue
    /// (status `Assigned`) and the pair is recorded.
    ///
    /// Fails with `AlreadyAssigned` when either side already participates
    /// in an active assignment.
    pub fn commit_assignment(&mut self, task_id: &str, robot_id: &str) -> Result<()> {
        if self.assignments.contains_key(task_id) {
            return Err(Error::AlreadyAssigned(format!("task {}", task_id)));
        }
        if self.assignments.values().any(|r| r == robot_id) {
            return Err(Error::AlreadyAssigned(format!("robot {}", robot_id)));
        }

        if let Some(idx) = self.pending.iter().position(|t| t.id == task_id) {
            let mut task = self.pending.remove(idx);
            task.status = TaskStatus::Assigned;
            self.records.insert(task.id.clone(), task);
        }
        self.assignments.insert(task_id.to_owned(), robot_id.to_owned());
        Ok(())
    }

    /// Update the recorded status of a committed task.
    pub fn set_task_status(&mut self, task_id: &str, status: TaskStatus) {
        if let Some(task) = self.records.get_mut(task_id) {
            task.status = status;
        }
    }

    /// Active assignments: task id -> robot id.
    pub fn assignments(&self) -> &HashMap<String, String> {
        &self.assignments
    }

    /// Drop the assignment record for a finished task. The task's terminal
    /// status stays on its record.
    pub fn mark_complete(&mut self, task_id: &str) {
        self.assignments.remove(task_id);
    }

    /// Drop every active assignment, making all robots eligible again.
    /// Used before a fresh dispatch.
    pub fn clear_all_assignments(&mut self) {
        self.assignments.clear();
    }

    /// Whether a robot participates in an active assignment.
    pub fn is_robot_assigned(&self, robot_id: &str) -> bool {
        self.assignments.values().any(|r| r == robot_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> TaskBoard {
        TaskBoard::new("m1")
    }

    #[test]
    fn test_task_ids_are_monotonic() {
        let mut board = board();
        assert_eq!(board.generate_task_id(), "task-0");
        assert_eq!(board.generate_task_id(), "task-1");
        assert_eq!(board.generate_task_id(), "task-2");
    }

    #[test]
    fn test_add_task_at_generates_description() {
        let mut board = board();
        let id = board.add_task_at(Position::new(3.0, 5.0), 0, "", Vec::new()).unwrap();
        let task = board.get_task_by_id(&id).unwrap();
        assert_eq!(task.description, "Task at (3, 5)");
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_non_finite_target_silently_dropped() {
        let mut board = board();
        assert!(board.add_task_at(Position::new(f32::NAN, 1.0), 0, "", Vec::new()).is_none());
        assert!(board
            .add_task_at(Position::new(1.0, f32::NEG_INFINITY), 0, "", Vec::new())
            .is_none());
        assert!(board.pending_tasks().is_empty());
    }

    #[test]
    fn test_canonical_order() {
        let mut board = board();
        board.add_task_at(Position::new(0.0, 0.0), 1, "low", Vec::new());
        board.add_task_at(Position::new(1.0, 0.0), 5, "high", Vec::new());
        board.add_task_at(Position::new(2.0, 0.0), 5, "high-later", Vec::new());

        let sorted = board.sorted_pending();
        assert_eq!(sorted[0].description, "high");
        assert_eq!(sorted[1].description, "high-later");
        assert_eq!(sorted[2].description, "low");
    }

    #[test]
    fn test_commit_moves_task_out_of_pending() {
        let mut board = board();
        let id = board.add_task_at(Position::new(1.0, 1.0), 0, "", Vec::new()).unwrap();
        board.commit_assignment(&id, "r1").unwrap();

        assert!(board.pending_tasks().is_empty());
        assert_eq!(board.get_task_by_id(&id).unwrap().status, TaskStatus::Assigned);
        assert_eq!(board.assignments().get(&id).unwrap(), "r1");
    }

    #[test]
    fn test_double_assignment_rejected() {
        let mut board = board();
        let a = board.add_task_at(Position::new(1.0, 1.0), 0, "", Vec::new()).unwrap();
        let b = board.add_task_at(Position::new(2.0, 2.0), 0, "", Vec::new()).unwrap();
        board.commit_assignment(&a, "r1").unwrap();

        assert!(matches!(
            board.commit_assignment(&a, "r2"),
            Err(Error::AlreadyAssigned(_))
        ));
        assert!(matches!(
            board.commit_assignment(&b, "r1"),
            Err(Error::AlreadyAssigned(_))
        ));
    }

    #[test]
    fn test_mark_complete_clears_assignment_only() {
        let mut board = board();
        let id = board.add_task_at(Position::new(1.0, 1.0), 0, "", Vec::new()).unwrap();
        board.commit_assignment(&id, "r1").unwrap();
        board.set_task_status(&id, TaskStatus::Completed);
        board.mark_complete(&id);

        assert!(board.assignments().is_empty());
        assert_eq!(board.get_task_by_id(&id).unwrap().status, TaskStatus::Completed);
    }

    #[test]
    fn test_clear_all_assignments_frees_robots() {
        let mut board = board();
        let a = board.add_task_at(Position::new(1.0, 1.0), 0, "", Vec::new()).unwrap();
        board.commit_assignment(&a, "r1").unwrap();
        assert!(board.is_robot_assigned("r1"));

        board.clear_all_assignments();
        assert!(!board.is_robot_assigned("r1"));
    }

    #[test]
    fn test_batch_add() {
        let mut board = board();
        board.add_tasks(&[
            (Position::new(1.0, 1.0), 0),
            (Position::new(2.0, 2.0), 3),
            (Position::new(f32::NAN, 0.0), 1),
        ]);
        assert_eq!(board.pending_tasks().len(), 2);
    }
}
