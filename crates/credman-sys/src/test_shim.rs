#![allow(unsafe_op_in_unsafe_fn, clippy::missing_safety_doc)]

//! In-process stand-in for the credman host, used by non-wasm builds.
//!
//! Tests load a request and a credential blob with [`set_request`] /
//! [`set_credentials`], pick a host version with [`set_wasm_version`], run
//! the matcher, and inspect the recorded [`DisplayEvent`]s. The shim is
//! process-global; tests that use it serialize on their own mutex.

use crate::CallingAppInfo;
use std::ffi::{CStr, c_char, c_void};
use std::sync::{Mutex, MutexGuard};

/// One recorded picker call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisplayEvent {
    AddStringIdEntry {
        cred_id: String,
        icon: Option<Vec<u8>>,
        title: String,
        subtitle: Option<String>,
        disclaimer: Option<String>,
        warning: Option<String>,
    },
    AddFieldForStringIdEntry {
        cred_id: String,
        display_name: String,
        display_value: Option<String>,
    },
    AddEntrySet {
        set_id: String,
        set_length: i32,
    },
    AddEntryToSet {
        cred_id: String,
        icon: Option<Vec<u8>>,
        title: String,
        subtitle: Option<String>,
        disclaimer: Option<String>,
        warning: Option<String>,
        metadata: Option<String>,
        set_id: String,
        set_index: i32,
    },
    AddFieldToEntrySet {
        cred_id: String,
        field_display_name: String,
        field_display_value: Option<String>,
        set_id: String,
        set_index: i32,
    },
}

static DISPLAY: Mutex<Vec<DisplayEvent>> = Mutex::new(Vec::new());
static REQUEST: Mutex<Vec<u8>> = Mutex::new(Vec::new());
static CREDENTIALS: Mutex<Vec<u8>> = Mutex::new(Vec::new());
static WASM_VERSION: Mutex<u32> = Mutex::new(1);
static APP_INFO: Mutex<(Vec<u8>, Vec<u8>)> = Mutex::new((Vec::new(), Vec::new()));

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub fn record(event: DisplayEvent) {
    lock(&DISPLAY).push(event);
}

/// Returns and clears the recorded picker calls.
pub fn take_display() -> Vec<DisplayEvent> {
    std::mem::take(&mut *lock(&DISPLAY))
}

pub fn set_request(data: &[u8]) {
    *lock(&REQUEST) = data.to_vec();
}

pub fn set_credentials(data: &[u8]) {
    *lock(&CREDENTIALS) = data.to_vec();
}

pub fn set_wasm_version(version: u32) {
    *lock(&WASM_VERSION) = version;
}

pub fn set_calling_app(package_name: &str, origin: &str) {
    *lock(&APP_INFO) = (
        package_name.as_bytes().to_vec(),
        origin.as_bytes().to_vec(),
    );
}

pub fn request_len() -> u32 {
    lock(&REQUEST).len() as u32
}

pub fn credentials_len() -> u32 {
    lock(&CREDENTIALS).len() as u32
}

pub fn wasm_version() -> u32 {
    *lock(&WASM_VERSION)
}

pub fn calling_app_info() -> CallingAppInfo {
    let (package_name, origin) = &*lock(&APP_INFO);
    let mut info = CallingAppInfo {
        package_name: [0; 256],
        origin: [0; 512],
    };
    let package_len = package_name.len().min(info.package_name.len() - 1);
    info.package_name[..package_len].copy_from_slice(&package_name[..package_len]);
    let origin_len = origin.len().min(info.origin.len() - 1);
    info.origin[..origin_len].copy_from_slice(&origin[..origin_len]);
    info
}

pub unsafe fn write_request(buffer: *mut c_void) {
    let data = lock(&REQUEST);
    if buffer.is_null() {
        return;
    }
    std::ptr::copy_nonoverlapping(data.as_ptr(), buffer as *mut u8, data.len());
}

pub unsafe fn read_credentials(buffer: *mut c_void, offset: usize, len: usize) -> usize {
    let data = lock(&CREDENTIALS);
    if buffer.is_null() || offset >= data.len() {
        return 0;
    }
    let to_copy = (data.len() - offset).min(len);
    std::ptr::copy_nonoverlapping(data.as_ptr().add(offset), buffer as *mut u8, to_copy);
    to_copy
}

pub unsafe fn c_str_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
}

pub unsafe fn bytes_from_ptr(ptr: *const c_char, len: usize) -> Option<Vec<u8>> {
    if ptr.is_null() || len == 0 {
        return None;
    }
    Some(std::slice::from_raw_parts(ptr as *const u8, len).to_vec())
}
