use crate::abi;

/// Picker API version of the host Credential Manager.
pub fn get_wasm_version() -> u32 {
    abi::get_wasm_version()
}
