//! Structured simulation event log.
//!
//! The planner and the movement executor append one line per event; external
//! readers tail the log and parse lines back into structured fields. Every
//! line is written atomically under the sink's mutex and flushed, so
//! concurrent planner runs interleave at line granularity only.
//!
//! Line grammar (the first token after the timestamp names the event kind):
//!
//! ```text
//! <ts> PLANNER_START robotId="…" robotName="…" start=(x,y) goal=(x,y) map=(WxH)
//! <ts> EXPAND robotId="…" x=N y=N cost=N parent=(x,y)
//! <ts> PUSH robotId="…" x=N y=N cost=N
//! <ts> PATH robotId="…" size=N start=(x,y) end=(x,y)
//! <ts> MOVE_EXECUTED robotId="…" x=N y=N
//! ```
//!
//! Timestamps are local time with millisecond resolution,
//! `YYYY-MM-DD HH:MM:SS.mmm`.

use crate::core::GridPoint;
use crate::error::Result;
use chrono::Local;
use log::warn;
use parking_lot::Mutex;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

enum Backend {
    File { file: File, path: PathBuf },
    Memory(Vec<String>),
}

/// Append-only, thread-safe event sink.
///
/// Production sinks append to a file; tests use the in-memory backend and
/// read lines back with [`lines`](EventSink::lines).
pub struct EventSink {
    backend: Mutex<Backend>,
}

impl EventSink {
    /// Open (or create) a file-backed sink in append mode.
    pub fn to_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            backend: Mutex::new(Backend::File { file, path }),
        })
    }

    /// Sink that collects lines in memory.
    pub fn in_memory() -> Self {
        Self {
            backend: Mutex::new(Backend::Memory(Vec::new())),
        }
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%d %H:%M:%S%.3f").to_string()
    }

    fn write_line(&self, body: String) {
        let line = format!("{} {}", Self::timestamp(), body);
        let mut backend = self.backend.lock();
        match &mut *backend {
            Backend::File { file, path } => {
                if let Err(e) = writeln!(file, "{}", line).and_then(|_| file.flush()) {
                    warn!("event sink write to {} failed: {}", path.display(), e);
                }
            }
            Backend::Memory(lines) => lines.push(line),
        }
    }

    /// Append a free-form line.
    pub fn log(&self, msg: &str) {
        self.write_line(msg.to_owned());
    }

    pub fn log_planner_start(
        &self,
        robot_id: &str,
        robot_name: &str,
        start: GridPoint,
        goal: GridPoint,
        width: usize,
        height: usize,
    ) {
        self.write_line(format!(
            "PLANNER_START robotId=\"{}\" robotName=\"{}\" start={} goal={} map=({}x{})",
            robot_id, robot_name, start, goal, width, height
        ));
    }

    /// Node popped from the search frontier. `parent` is (-1,-1) for the
    /// source cell.
    pub fn log_expand(&self, robot_id: &str, node: GridPoint, cost: i32, parent: GridPoint) {
        self.write_line(format!(
            "EXPAND robotId=\"{}\" x={} y={} cost={} parent={}",
            robot_id, node.x, node.y, cost, parent
        ));
    }

    /// Neighbor relaxed and enqueued with a new best cost.
    pub fn log_push(&self, robot_id: &str, node: GridPoint, cost: i32) {
        self.write_line(format!(
            "PUSH robotId=\"{}\" x={} y={} cost={}",
            robot_id, node.x, node.y, cost
        ));
    }

    /// Reconstructed path summary: size and endpoints only, to keep the log
    /// small.
    pub fn log_path(&self, robot_id: &str, path: &[GridPoint]) {
        let mut body = format!("PATH robotId=\"{}\" size={}", robot_id, path.len());
        if let (Some(first), Some(last)) = (path.first(), path.last()) {
            body.push_str(&format!(" start={} end={}", first, last));
        }
        self.write_line(body);
    }

    /// One grid step applied to a robot.
    pub fn log_move_executed(&self, robot_id: &str, node: GridPoint) {
        self.write_line(format!(
            "MOVE_EXECUTED robotId=\"{}\" x={} y={}",
            robot_id, node.x, node.y
        ));
    }

    /// Truncate the log. Used between simulations.
    pub fn clear(&self) -> Result<()> {
        let mut backend = self.backend.lock();
        match &mut *backend {
            Backend::File { file, .. } => {
                file.set_len(0)?;
                Ok(())
            }
            Backend::Memory(lines) => {
                lines.clear();
                Ok(())
            }
        }
    }

    /// Snapshot of all logged lines.
    pub fn lines(&self) -> Result<Vec<String>> {
        let backend = self.backend.lock();
        match &*backend {
            Backend::File { path, .. } => {
                let content = std::fs::read_to_string(path)?;
                Ok(content.lines().map(str::to_owned).collect())
            }
            Backend::Memory(lines) => Ok(lines.clone()),
        }
    }
}

/// Event kind token of a log line, if it carries one.
///
/// Splits off the `YYYY-MM-DD HH:MM:SS.mmm` prefix and returns the first
/// payload token. Free-form lines return their first word.
pub fn event_kind(line: &str) -> Option<&str> {
    line.split_whitespace().nth(2)
}
