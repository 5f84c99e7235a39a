//! Error types for the fleet controller.
//!
//! Errors cross component boundaries as values, never as panics. The
//! variants mirror the failure surface the ingress has to translate:
//! bad input, missing entities, grid bounds, planner rejections, and
//! assignment conflicts.

use thiserror::Error;
use yantra_modules::ModuleError;

/// Fleet controller error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("grid access out of range: ({x}, {y})")]
    OutOfRange { x: i32, y: i32 },

    #[error("target unreachable: {0}")]
    Unreachable(UnreachableReason),

    #[error("already assigned: {0}")]
    AlreadyAssigned(String),

    #[error("module error: {0}")]
    Module(#[from] ModuleError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Why the planner rejected or failed a navigation request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnreachableReason {
    /// Target cell is outside the grid.
    OutOfBounds,
    /// Target cell is blocked.
    Blocked,
    /// The robot's own cell is blocked.
    StartBlocked,
    /// Search exhausted the grid without reaching the target.
    NoPath,
}

impl std::fmt::Display for UnreachableReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            UnreachableReason::OutOfBounds => "target out of bounds",
            UnreachableReason::Blocked => "target blocked",
            UnreachableReason::StartBlocked => "start blocked",
            UnreachableReason::NoPath => "no path",
        };
        f.write_str(s)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
