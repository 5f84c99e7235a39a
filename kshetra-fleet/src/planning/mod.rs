//! Grid path planning.
//!
//! Two capabilities, both over the same 4-connected uniform-cost search:
//!
//! - [`shortest_path`]: pure cost query used by the dispatcher's cost
//!   matrices. Emits nothing.
//! - [`Navigator`]: mutating execution that walks a robot along the
//!   reconstructed path, emits the simulation event stream, and invokes the
//!   task's action modules on arrival.

mod dijkstra;
mod navigator;

pub use dijkstra::shortest_path;
pub use navigator::{NavigationReport, Navigator};

pub(crate) use dijkstra::{SearchStep, search};
