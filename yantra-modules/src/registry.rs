//! Process-wide registry of action-module callbacks.
//!
//! Plugins register a callback under their module id when they start; the
//! fleet planner invokes those callbacks when a robot arrives at a task
//! target. The registry is a process-wide singleton because the plugin ABI
//! is C-style and carries no per-instance context on the callback side.
//!
//! Callbacks are cloned out under the lock and called with the lock
//! released, so a callback may re-enter the registry (for example to
//! register or unregister other modules) without deadlocking.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

/// A registered action callback. Receives the invocation context
/// (typically the task id) as a string slice.
pub type ModuleCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// Thread-safe map from module id to callback.
pub struct ModuleRegistry {
    callbacks: Mutex<HashMap<String, ModuleCallback>>,
}

impl ModuleRegistry {
    /// The process-wide registry instance.
    pub fn global() -> &'static ModuleRegistry {
        static REGISTRY: OnceLock<ModuleRegistry> = OnceLock::new();
        REGISTRY.get_or_init(ModuleRegistry::new)
    }

    /// Create a standalone registry. Production code uses [`global`];
    /// standalone instances exist for isolated tests.
    ///
    /// [`global`]: ModuleRegistry::global
    pub fn new() -> Self {
        Self {
            callbacks: Mutex::new(HashMap::new()),
        }
    }

    /// Register a callback under `module_id`, replacing any previous one.
    pub fn register(&self, module_id: impl Into<String>, callback: ModuleCallback) {
        let module_id = module_id.into();
        log::debug!("registering module callback: {}", module_id);
        self.callbacks.lock().insert(module_id, callback);
    }

    /// Remove the callback for `module_id`. Returns false if none existed.
    pub fn unregister(&self, module_id: &str) -> bool {
        self.callbacks.lock().remove(module_id).is_some()
    }

    /// Invoke the callback for `module_id` with `context`.
    ///
    /// Returns false if no callback is registered. The callback runs with
    /// the registry lock released.
    pub fn invoke(&self, module_id: &str, context: &str) -> bool {
        let callback = {
            let callbacks = self.callbacks.lock();
            match callbacks.get(module_id) {
                Some(cb) => Arc::clone(cb),
                None => return false,
            }
        };
        callback(context);
        true
    }

    /// Invoke every registered callback with `context`.
    ///
    /// The callback set is snapshotted under the lock and invoked outside
    /// it; callbacks registered during the sweep are not called.
    pub fn invoke_all(&self, context: &str) {
        let snapshot: Vec<ModuleCallback> = {
            let callbacks = self.callbacks.lock();
            callbacks.values().cloned().collect()
        };
        for callback in snapshot {
            callback(context);
        }
    }

    /// Ids of all registered callbacks.
    pub fn list(&self) -> Vec<String> {
        self.callbacks.lock().keys().cloned().collect()
    }
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
