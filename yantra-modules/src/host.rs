//! Dynamic loader for action-module artifacts.
//!
//! The host owns the loaded library handles and their lifecycle:
//!
//! 1. resolve `plugin_start` (required) and `plugin_stop` (optional),
//! 2. call `plugin_start` with the [`HostApi`] vtable and the module id
//!    (the artifact's file stem),
//! 3. on a non-zero return, call `plugin_stop` if present and release the
//!    handle.
//!
//! Successful loads are recorded in insertion order and unloaded in reverse.
//! Loading the same module id again unloads the previous artifact first, so
//! the registry never holds a callback whose artifact has been released.
//! Loading and unloading take `&mut self`; callers serialize them.

use crate::abi::{HostApi, PluginStartFn, PluginStopFn};
use crate::error::{ModuleError, Result};
use crate::registry::ModuleRegistry;
use libloading::Library;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::CString;
use std::path::{Path, PathBuf};

/// Ingress-visible record of a loaded artifact.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModuleDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub enabled: bool,
}

struct LoadedModule {
    module_id: String,
    path: PathBuf,
    stop: Option<PluginStopFn>,
    // Dropped last: `stop` was resolved from this library and must not
    // outlive it.
    library: Library,
}

/// Owns loaded artifacts and the enabled set that gates ingress invocation.
pub struct ModuleHost {
    modules: Vec<LoadedModule>,
    enabled: HashSet<String>,
    // Boxed so the vtable address handed to `plugin_start` stays stable for
    // the lifetime of the host.
    api: Box<HostApi>,
}

// The vtable's host_ctx is always null and never dereferenced; all mutable
// state lives in the process-wide registry.
unsafe impl Send for ModuleHost {}

impl ModuleHost {
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            enabled: HashSet::new(),
            api: Box::new(HostApi::for_global_registry()),
        }
    }

    /// Load one artifact. Returns the module id (the file stem).
    ///
    /// An artifact already loaded under the same id is unloaded first.
    pub fn load_artifact(&mut self, path: &Path) -> Result<String> {
        let module_id = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .map(str::to_owned)
            .ok_or_else(|| {
                ModuleError::LoadFailure(format!("artifact has no usable file stem: {}", path.display()))
            })?;

        // Hot reload: drop the previous artifact before starting the new one.
        if self.unload(&module_id) {
            info!("replacing already-loaded module {}", module_id);
        }

        let library = unsafe { Library::new(path) }.map_err(|e| {
            ModuleError::LoadFailure(format!("failed to open {}: {}", path.display(), e))
        })?;

        let start: PluginStartFn = unsafe {
            *library.get::<PluginStartFn>(b"plugin_start\0").map_err(|e| {
                ModuleError::LoadFailure(format!("plugin_start not found in {}: {}", path.display(), e))
            })?
        };
        let stop: Option<PluginStopFn> =
            unsafe { library.get::<PluginStopFn>(b"plugin_stop\0").map(|sym| *sym).ok() };

        let id_cstr = CString::new(module_id.as_str())
            .map_err(|_| ModuleError::LoadFailure(format!("module id contains NUL: {}", module_id)))?;
        let rc = unsafe { start(self.api.as_ref(), id_cstr.as_ptr()) };
        if rc != 0 {
            warn!("plugin_start failed for {} (rc={})", path.display(), rc);
            if let Some(stop) = stop {
                unsafe { stop() };
            }
            return Err(ModuleError::LoadFailure(format!(
                "plugin_start returned {} for {}",
                rc,
                path.display()
            )));
        }

        info!("loaded module {} from {}", module_id, path.display());
        self.modules.push(LoadedModule {
            module_id: module_id.clone(),
            path: path.to_owned(),
            stop,
            library,
        });
        Ok(module_id)
    }

    /// Load every artifact with the platform dynamic-library extension in
    /// `dir`. Individual failures are logged and skipped; returns the number
    /// of modules loaded.
    pub fn load_directory(&mut self, dir: &Path) -> Result<usize> {
        let mut loaded = 0;
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            let is_artifact = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext == std::env::consts::DLL_EXTENSION)
                .unwrap_or(false);
            if !is_artifact {
                continue;
            }
            match self.load_artifact(&path) {
                Ok(_) => loaded += 1,
                Err(e) => warn!("skipping artifact {}: {}", path.display(), e),
            }
        }
        Ok(loaded)
    }

    /// Unload the artifact registered under `module_id`, if any.
    pub fn unload(&mut self, module_id: &str) -> bool {
        let Some(idx) = self.modules.iter().position(|m| m.module_id == module_id) else {
            return false;
        };
        let module = self.modules.remove(idx);
        Self::release(module);
        true
    }

    /// Unload all artifacts in reverse load order.
    pub fn unload_all(&mut self) {
        while let Some(module) = self.modules.pop() {
            Self::release(module);
        }
    }

    fn release(module: LoadedModule) {
        if let Some(stop) = module.stop {
            unsafe { stop() };
        }
        info!("unloaded module {} ({})", module.module_id, module.path.display());
        drop(module.library);
    }

    /// Replace the enabled set. Ids that are not loaded are kept; they take
    /// effect if an artifact with that id is loaded later.
    pub fn set_enabled(&mut self, ids: impl IntoIterator<Item = String>) {
        self.enabled = ids.into_iter().collect();
    }

    pub fn is_enabled(&self, module_id: &str) -> bool {
        self.enabled.contains(module_id)
    }

    /// Invoke a module on behalf of the ingress.
    ///
    /// Returns `Ok(false)` when the module is loaded-but-disabled (the
    /// request is dropped), `Ok(true)` when the callback ran, and
    /// [`ModuleError::NotFound`] when no callback is registered.
    pub fn invoke(&self, module_id: &str, context: &str) -> Result<bool> {
        if !self.is_enabled(module_id) {
            return Ok(false);
        }
        if !ModuleRegistry::global().invoke(module_id, context) {
            return Err(ModuleError::NotFound(module_id.to_owned()));
        }
        Ok(true)
    }

    /// Module ids in load order.
    pub fn loaded(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.module_id.clone()).collect()
    }

    /// Descriptors for the ingress module listing.
    pub fn descriptors(&self) -> Vec<ModuleDescriptor> {
        self.modules
            .iter()
            .map(|m| ModuleDescriptor {
                id: m.module_id.clone(),
                name: m.module_id.clone(),
                description: m.path.display().to_string(),
                enabled: self.enabled.contains(&m.module_id),
            })
            .collect()
    }
}

impl Default for ModuleHost {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ModuleHost {
    fn drop(&mut self) {
        self.unload_all();
    }
}
