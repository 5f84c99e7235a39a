//! Error types for the module host.

use thiserror::Error;

/// Errors raised while loading or invoking action modules.
#[derive(Error, Debug)]
pub enum ModuleError {
    #[error("load failure: {0}")]
    LoadFailure(String),

    #[error("module not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ModuleError>;
