//! Sample action module.
//!
//! Registers a callback under its own module id (the artifact file stem)
//! and logs a watering action through the host whenever a robot arrives at
//! a task target carrying this module id.

use std::ffi::{CStr, CString, c_char, c_int};
use std::sync::Mutex;
use yantra_modules::abi::{HostApi, LOG_INFO};

struct PluginState {
    api: *const HostApi,
    module_id: CString,
}

// The host serializes plugin_start/plugin_stop and keeps the vtable alive
// while the artifact is loaded.
unsafe impl Send for PluginState {}

static STATE: Mutex<Option<PluginState>> = Mutex::new(None);

fn host_log(message: &str) {
    let guard = STATE.lock().unwrap_or_else(|e| e.into_inner());
    if let Some(state) = guard.as_ref() {
        let api = unsafe { &*state.api };
        if let Ok(msg) = CString::new(message) {
            unsafe { (api.log)(api.host_ctx, LOG_INFO, msg.as_ptr()) };
        }
    }
}

unsafe extern "C" fn watering_callback(context: *const c_char) {
    let ctx = if context.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(context) }.to_string_lossy().into_owned()
    };
    host_log(&format!("watering-plugin: watering with ctx={}", ctx));
}

/// Entry point called by the host after loading the artifact.
///
/// # Safety
/// `api` must point to a vtable that outlives the artifact; `module_id`
/// must be a NUL-terminated string. Both are guaranteed by the host.
#[no_mangle]
pub unsafe extern "C" fn plugin_start(api: *const HostApi, module_id: *const c_char) -> c_int {
    if api.is_null() || module_id.is_null() {
        return -1;
    }
    let module_id = unsafe { CStr::from_ptr(module_id) }.to_owned();

    {
        let mut guard = STATE.lock().unwrap_or_else(|e| e.into_inner());
        *guard = Some(PluginState { api, module_id: module_id.clone() });
    }

    let api = unsafe { &*api };
    unsafe { (api.register_callback)(api.host_ctx, module_id.as_ptr(), watering_callback) };
    host_log("watering-plugin: started");
    0
}

/// Optional teardown called before the host releases the artifact.
///
/// # Safety
/// Must only be called by the host that called `plugin_start`.
#[no_mangle]
pub unsafe extern "C" fn plugin_stop() {
    let state = {
        let mut guard = STATE.lock().unwrap_or_else(|e| e.into_inner());
        guard.take()
    };
    if let Some(state) = state {
        let api = unsafe { &*state.api };
        unsafe { (api.unregister_callback)(api.host_ctx, state.module_id.as_ptr()) };
        unsafe {
            let msg = CString::new("watering-plugin: stopped").unwrap_or_default();
            (api.log)(api.host_ctx, LOG_INFO, msg.as_ptr());
        }
    }
}
