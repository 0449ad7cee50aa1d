use credman_sys::{credman, credman_v2};
use std::ffi::{CString, c_char};
use std::ptr;

fn to_c_str(s: Option<&str>) -> (Option<CString>, *const c_char) {
    match s {
        Some(value) => {
            let c_str = CString::new(value).unwrap_or_default();
            let ptr = c_str.as_ptr();
            (Some(c_str), ptr)
        }
        None => (None, ptr::null()),
    }
}

fn to_bytes_ptr_len(bytes: Option<&[u8]>) -> (*const c_char, usize) {
    match bytes {
        Some(bytes) => (bytes.as_ptr() as *const c_char, bytes.len()),
        None => (ptr::null(), 0),
    }
}

pub fn add_string_id_entry(
    cred_id: &str,
    icon: Option<&[u8]>,
    title: &str,
    subtitle: Option<&str>,
    disclaimer: Option<&str>,
    warning: Option<&str>,
) {
    let (_c_cred_id, p_cred_id) = to_c_str(Some(cred_id));
    let (p_icon, icon_len) = to_bytes_ptr_len(icon);
    let (_c_title, p_title) = to_c_str(Some(title));
    let (_c_subtitle, p_subtitle) = to_c_str(subtitle);
    let (_c_disclaimer, p_disclaimer) = to_c_str(disclaimer);
    let (_c_warning, p_warning) = to_c_str(warning);

    unsafe {
        credman::AddStringIdEntry(
            p_cred_id,
            p_icon,
            icon_len,
            p_title,
            p_subtitle,
            p_disclaimer,
            p_warning,
        );
    }
}

pub fn add_field_for_string_id_entry(
    cred_id: &str,
    field_display_name: &str,
    field_display_value: Option<&str>,
) {
    let (_c_cred_id, p_cred_id) = to_c_str(Some(cred_id));
    let (_c_name, p_name) = to_c_str(Some(field_display_name));
    let (_c_value, p_value) = to_c_str(field_display_value);

    unsafe {
        credman::AddFieldForStringIdEntry(p_cred_id, p_name, p_value);
    }
}

pub fn add_entry_set(set_id: &str, set_length: i32) {
    let (_c_set_id, p_set_id) = to_c_str(Some(set_id));
    unsafe {
        credman_v2::AddEntrySet(p_set_id, set_length);
    }
}

#[allow(clippy::too_many_arguments)]
pub fn add_entry_to_set(
    cred_id: &str,
    icon: Option<&[u8]>,
    title: &str,
    subtitle: Option<&str>,
    disclaimer: Option<&str>,
    warning: Option<&str>,
    metadata: Option<&str>,
    set_id: &str,
    set_index: i32,
) {
    let (_c_cred_id, p_cred_id) = to_c_str(Some(cred_id));
    let (p_icon, icon_len) = to_bytes_ptr_len(icon);
    let (_c_title, p_title) = to_c_str(Some(title));
    let (_c_subtitle, p_subtitle) = to_c_str(subtitle);
    let (_c_disclaimer, p_disclaimer) = to_c_str(disclaimer);
    let (_c_warning, p_warning) = to_c_str(warning);
    let (_c_metadata, p_metadata) = to_c_str(metadata);
    let (_c_set_id, p_set_id) = to_c_str(Some(set_id));

    unsafe {
        credman_v2::AddEntryToSet(
            p_cred_id,
            p_icon,
            icon_len,
            p_title,
            p_subtitle,
            p_disclaimer,
            p_warning,
            p_metadata,
            p_set_id,
            set_index,
        );
    }
}

pub fn add_field_to_entry_set(
    cred_id: &str,
    field_display_name: &str,
    field_display_value: Option<&str>,
    set_id: &str,
    set_index: i32,
) {
    let (_c_cred_id, p_cred_id) = to_c_str(Some(cred_id));
    let (_c_name, p_name) = to_c_str(Some(field_display_name));
    let (_c_value, p_value) = to_c_str(field_display_value);
    let (_c_set_id, p_set_id) = to_c_str(Some(set_id));

    unsafe {
        credman_v2::AddFieldToEntrySet(p_cred_id, p_name, p_value, p_set_id, set_index);
    }
}

pub fn get_request_size() -> u32 {
    let mut size: u32 = 0;
    unsafe {
        credman::GetRequestSize(&mut size);
    }
    size
}

pub fn get_request_buffer(buffer: &mut [u8]) {
    unsafe {
        credman::GetRequestBuffer(buffer.as_mut_ptr() as *mut _);
    }
}

pub fn get_credentials_size() -> u32 {
    let mut size: u32 = 0;
    unsafe {
        credman::GetCredentialsSize(&mut size);
    }
    size
}

pub fn read_credentials_buffer(buffer: &mut [u8], offset: usize) -> usize {
    unsafe { credman::ReadCredentialsBuffer(buffer.as_mut_ptr() as *mut _, offset, buffer.len()) }
}

pub fn get_wasm_version() -> u32 {
    let mut version: u32 = 0;
    unsafe {
        credman::GetWasmVersion(&mut version);
    }
    version
}

pub fn get_calling_app_info() -> credman_sys::CallingAppInfo {
    let mut info = credman_sys::CallingAppInfo {
        package_name: [0; 256],
        origin: [0; 512],
    };
    unsafe {
        credman::GetCallingAppInfo(&mut info);
    }
    info
}
