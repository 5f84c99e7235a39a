//! C ABI shared between the host and action-module artifacts.
//!
//! Artifacts are platform dynamic libraries exporting two symbols:
//!
//! ```c
//! int  plugin_start(const struct HostApi* api, const char* module_id); // 0 = success
//! void plugin_stop(void);                                              // optional
//! ```
//!
//! `plugin_start` receives a [`HostApi`] vtable it may use for the lifetime
//! of the artifact to register callbacks and write log lines. Raw pointers
//! stay confined to this module and to the host: the register adapter
//! upgrades the `*const c_char` context to an owned `String` before anything
//! reaches the [`ModuleRegistry`](crate::ModuleRegistry).

use crate::registry::{ModuleCallback, ModuleRegistry};
use std::ffi::{CStr, CString, c_char, c_int, c_void};
use std::sync::Arc;

/// Callback exported by a plugin; receives a NUL-terminated context string.
pub type PluginCallbackFn = unsafe extern "C" fn(context: *const c_char);

/// `plugin_start` entry point signature.
pub type PluginStartFn =
    unsafe extern "C" fn(api: *const HostApi, module_id: *const c_char) -> c_int;

/// Optional `plugin_stop` entry point signature.
pub type PluginStopFn = unsafe extern "C" fn();

pub const LOG_INFO: c_int = 0;
pub const LOG_WARN: c_int = 1;
pub const LOG_ERROR: c_int = 2;
pub const LOG_DEBUG: c_int = 3;

/// Host vtable handed to `plugin_start`.
///
/// `host_ctx` is an opaque pointer passed back on every call so the host can
/// associate calls with an instance. The current host keeps all state in the
/// process-wide registry and passes a null context.
#[repr(C)]
pub struct HostApi {
    pub host_ctx: *mut c_void,
    pub register_callback:
        unsafe extern "C" fn(host_ctx: *mut c_void, module_id: *const c_char, cb: PluginCallbackFn),
    pub unregister_callback:
        unsafe extern "C" fn(host_ctx: *mut c_void, module_id: *const c_char),
    pub log: unsafe extern "C" fn(host_ctx: *mut c_void, level: c_int, msg: *const c_char),
}

impl HostApi {
    /// Vtable wired to the process-wide registry and the `log` facade.
    pub(crate) fn for_global_registry() -> Self {
        Self {
            host_ctx: std::ptr::null_mut(),
            register_callback: host_register,
            unregister_callback: host_unregister,
            log: host_log,
        }
    }
}

unsafe extern "C" fn host_register(
    _host_ctx: *mut c_void,
    module_id: *const c_char,
    cb: PluginCallbackFn,
) {
    if module_id.is_null() {
        return;
    }
    let id = match unsafe { CStr::from_ptr(module_id) }.to_str() {
        Ok(id) => id.to_owned(),
        Err(_) => {
            log::warn!("plugin-host: rejecting non-UTF-8 module id");
            return;
        }
    };

    // Adapter: owned string in, NUL-terminated string out to the raw callback.
    let adapter: ModuleCallback = Arc::new(move |context: &str| {
        let context = CString::new(context).unwrap_or_default();
        unsafe { cb(context.as_ptr()) };
    });
    ModuleRegistry::global().register(id, adapter);
}

unsafe extern "C" fn host_unregister(_host_ctx: *mut c_void, module_id: *const c_char) {
    if module_id.is_null() {
        return;
    }
    if let Ok(id) = unsafe { CStr::from_ptr(module_id) }.to_str() {
        ModuleRegistry::global().unregister(id);
    }
}

unsafe extern "C" fn host_log(_host_ctx: *mut c_void, level: c_int, msg: *const c_char) {
    if msg.is_null() {
        return;
    }
    let msg = unsafe { CStr::from_ptr(msg) }.to_string_lossy();
    match level {
        LOG_WARN => log::warn!(target: "plugin-host", "{}", msg),
        LOG_ERROR => log::error!(target: "plugin-host", "{}", msg),
        LOG_DEBUG => log::debug!(target: "plugin-host", "{}", msg),
        _ => log::info!(target: "plugin-host", "{}", msg),
    }
}
