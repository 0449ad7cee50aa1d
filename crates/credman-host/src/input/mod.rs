mod app_info;
mod reader;
mod request;
mod version;

pub use app_info::{CallingAppInfo, get_calling_app_info};
pub use reader::CredentialReader;
pub use request::{get_request, get_request_string};
pub use version::get_wasm_version;
