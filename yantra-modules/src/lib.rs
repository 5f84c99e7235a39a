//! # Yantra-Modules: Action-Module Host
//!
//! Dynamically-loaded "action modules" give the fleet controller its
//! post-arrival behaviors: when a robot reaches a task target, the planner
//! invokes each module id attached to the task. This crate provides the
//! three pieces that make that work:
//!
//! - [`ModuleRegistry`]: process-wide map from module id to callback.
//!   Registration overwrites, invocation happens outside the registry lock,
//!   and callbacks may re-enter the registry.
//! - [`abi`]: the C ABI shared with artifacts (`plugin_start`/`plugin_stop`
//!   entry points and the [`HostApi`](abi::HostApi) vtable). Raw pointers
//!   never escape this boundary; the host-side adapter upgrades the
//!   C context string to an owned `String`.
//! - [`ModuleHost`]: loads artifacts, drives their lifecycle (insertion-order
//!   load, reverse-order unload, unload-before-replace), and gates ingress
//!   invocations through an enabled set.
//!
//! ## Writing a module
//!
//! ```rust,ignore
//! use yantra_modules::abi::{HostApi, LOG_INFO};
//! use std::ffi::{c_char, c_int};
//!
//! #[no_mangle]
//! pub unsafe extern "C" fn plugin_start(api: *const HostApi, module_id: *const c_char) -> c_int {
//!     // store api, register a callback under module_id...
//!     0
//! }
//! ```
//!
//! See the `watering` plugin in this workspace for a complete artifact.

pub mod abi;
pub mod error;
pub mod host;
pub mod registry;

pub use error::{ModuleError, Result};
pub use host::{ModuleDescriptor, ModuleHost};
pub use registry::{ModuleCallback, ModuleRegistry};
