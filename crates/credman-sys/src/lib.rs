#![doc = include_str!("../README.md")]

use std::ffi::{c_char, c_void};

#[cfg(not(target_arch = "wasm32"))]
pub mod test_shim;

/// Information about the application requesting the credential.
///
/// Populated by the host through `GetCallingAppInfo`. Either field may be
/// empty: `package_name` is set for installed-app callers, `origin` for
/// browser callers.
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct CallingAppInfo {
    /// Android package name of the caller, NUL-terminated if shorter than
    /// the buffer.
    pub package_name: [u8; 256],
    /// Web origin of the caller, NUL-terminated if shorter than the buffer.
    pub origin: [u8; 512],
}

#[cfg(target_arch = "wasm32")]
pub mod credman {
    use super::*;

    #[link(wasm_import_module = "credman")]
    unsafe extern "C" {
        /// Adds a standalone credential entry to the system picker.
        ///
        /// `icon` may be null (`icon_len` 0). `subtitle`, `disclaimer` and
        /// `warning` may be null.
        pub fn AddStringIdEntry(
            cred_id: *const c_char,
            icon: *const c_char,
            icon_len: usize,
            title: *const c_char,
            subtitle: *const c_char,
            disclaimer: *const c_char,
            warning: *const c_char,
        );

        /// Adds a key/value detail field to a previously added entry.
        /// Fields are displayed in the order they are added.
        pub fn AddFieldForStringIdEntry(
            cred_id: *const c_char,
            field_display_name: *const c_char,
            field_display_value: *const c_char,
        );

        /// Copies the verifier's JSON request envelope into `buffer`.
        /// Call [`GetRequestSize`] first to size the buffer.
        pub fn GetRequestBuffer(buffer: *mut c_void);

        /// Size in bytes of the verifier's JSON request envelope.
        pub fn GetRequestSize(size: *mut u32);

        /// Reads a chunk of the registered credential catalog at `offset`.
        /// Returns the number of bytes actually copied, which may be less
        /// than `len`.
        pub fn ReadCredentialsBuffer(buffer: *mut c_void, offset: usize, len: usize) -> usize;

        /// Total size in bytes of the registered credential catalog.
        pub fn GetCredentialsSize(size: *mut u32);

        /// Picker API version of the host. Version 2 adds the entry-set
        /// functions in the `credman_v2` module.
        pub fn GetWasmVersion(version: *mut u32);

        /// Fills [`CallingAppInfo`] with details about the caller.
        pub fn GetCallingAppInfo(info: *mut CallingAppInfo);
    }
}

#[cfg(target_arch = "wasm32")]
pub mod credman_v2 {
    use super::*;

    #[link(wasm_import_module = "credman_v2")]
    unsafe extern "C" {
        /// Creates an entry set with `set_length` slots. Must be called
        /// before adding entries to the set.
        pub fn AddEntrySet(set_id: *const c_char, set_length: i32);

        /// Adds a credential entry at slot `set_index` of an existing set.
        /// Multiple entries at the same index are alternatives the user
        /// chooses between.
        pub fn AddEntryToSet(
            cred_id: *const c_char,
            icon: *const c_char,
            icon_len: usize,
            title: *const c_char,
            subtitle: *const c_char,
            disclaimer: *const c_char,
            warning: *const c_char,
            metadata: *const c_char,
            set_id: *const c_char,
            set_index: i32,
        );

        /// Adds a key/value detail field to an entry inside a set slot.
        pub fn AddFieldToEntrySet(
            cred_id: *const c_char,
            field_display_name: *const c_char,
            field_display_value: *const c_char,
            set_id: *const c_char,
            set_index: i32,
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[allow(
    non_snake_case,
    unsafe_op_in_unsafe_fn,
    clippy::missing_safety_doc,
    clippy::too_many_arguments
)]
pub mod credman {
    use super::*;
    use crate::test_shim;

    pub unsafe fn AddStringIdEntry(
        cred_id: *const c_char,
        icon: *const c_char,
        icon_len: usize,
        title: *const c_char,
        subtitle: *const c_char,
        disclaimer: *const c_char,
        warning: *const c_char,
    ) {
        test_shim::record(test_shim::DisplayEvent::AddStringIdEntry {
            cred_id: test_shim::c_str_to_string(cred_id).unwrap_or_default(),
            icon: test_shim::bytes_from_ptr(icon, icon_len),
            title: test_shim::c_str_to_string(title).unwrap_or_default(),
            subtitle: test_shim::c_str_to_string(subtitle),
            disclaimer: test_shim::c_str_to_string(disclaimer),
            warning: test_shim::c_str_to_string(warning),
        });
    }

    pub unsafe fn AddFieldForStringIdEntry(
        cred_id: *const c_char,
        field_display_name: *const c_char,
        field_display_value: *const c_char,
    ) {
        test_shim::record(test_shim::DisplayEvent::AddFieldForStringIdEntry {
            cred_id: test_shim::c_str_to_string(cred_id).unwrap_or_default(),
            display_name: test_shim::c_str_to_string(field_display_name).unwrap_or_default(),
            display_value: test_shim::c_str_to_string(field_display_value),
        });
    }

    pub unsafe fn GetRequestBuffer(buffer: *mut c_void) {
        test_shim::write_request(buffer);
    }

    pub unsafe fn GetRequestSize(size: *mut u32) {
        if let Some(size) = size.as_mut() {
            *size = test_shim::request_len();
        }
    }

    pub unsafe fn ReadCredentialsBuffer(buffer: *mut c_void, offset: usize, len: usize) -> usize {
        test_shim::read_credentials(buffer, offset, len)
    }

    pub unsafe fn GetCredentialsSize(size: *mut u32) {
        if let Some(size) = size.as_mut() {
            *size = test_shim::credentials_len();
        }
    }

    pub unsafe fn GetWasmVersion(version: *mut u32) {
        if let Some(version) = version.as_mut() {
            *version = test_shim::wasm_version();
        }
    }

    pub unsafe fn GetCallingAppInfo(info: *mut CallingAppInfo) {
        if let Some(info) = info.as_mut() {
            *info = test_shim::calling_app_info();
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[allow(
    non_snake_case,
    unsafe_op_in_unsafe_fn,
    clippy::missing_safety_doc,
    clippy::too_many_arguments
)]
pub mod credman_v2 {
    use super::*;
    use crate::test_shim;

    pub unsafe fn AddEntrySet(set_id: *const c_char, set_length: i32) {
        test_shim::record(test_shim::DisplayEvent::AddEntrySet {
            set_id: test_shim::c_str_to_string(set_id).unwrap_or_default(),
            set_length,
        });
    }

    pub unsafe fn AddEntryToSet(
        cred_id: *const c_char,
        icon: *const c_char,
        icon_len: usize,
        title: *const c_char,
        subtitle: *const c_char,
        disclaimer: *const c_char,
        warning: *const c_char,
        metadata: *const c_char,
        set_id: *const c_char,
        set_index: i32,
    ) {
        test_shim::record(test_shim::DisplayEvent::AddEntryToSet {
            cred_id: test_shim::c_str_to_string(cred_id).unwrap_or_default(),
            icon: test_shim::bytes_from_ptr(icon, icon_len),
            title: test_shim::c_str_to_string(title).unwrap_or_default(),
            subtitle: test_shim::c_str_to_string(subtitle),
            disclaimer: test_shim::c_str_to_string(disclaimer),
            warning: test_shim::c_str_to_string(warning),
            metadata: test_shim::c_str_to_string(metadata),
            set_id: test_shim::c_str_to_string(set_id).unwrap_or_default(),
            set_index,
        });
    }

    pub unsafe fn AddFieldToEntrySet(
        cred_id: *const c_char,
        field_display_name: *const c_char,
        field_display_value: *const c_char,
        set_id: *const c_char,
        set_index: i32,
    ) {
        test_shim::record(test_shim::DisplayEvent::AddFieldToEntrySet {
            cred_id: test_shim::c_str_to_string(cred_id).unwrap_or_default(),
            field_display_name: test_shim::c_str_to_string(field_display_name).unwrap_or_default(),
            field_display_value: test_shim::c_str_to_string(field_display_value),
            set_id: test_shim::c_str_to_string(set_id).unwrap_or_default(),
            set_index,
        });
    }
}
