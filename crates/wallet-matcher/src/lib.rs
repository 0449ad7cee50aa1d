#![no_std]
#![doc = include_str!("../README.md")]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

#[cfg(feature = "std")]
use alloc::string::String;
#[cfg(feature = "std")]
use alloc::vec::Vec;
#[cfg(feature = "std")]
use credman_host::{CredentialReader, get_calling_app_info};
#[cfg(feature = "std")]
use matcher_core::{Catalog, credential_matcher, match_request_envelope};
#[cfg(feature = "std")]
use std::io::Read;

#[cfg(feature = "std")]
#[credential_matcher]
pub fn matcher_entrypoint(request: String, mut credentials: CredentialReader) {
    let mut raw = Vec::with_capacity(credentials.len() as usize);
    if credentials.read_to_end(&mut raw).is_err() {
        return;
    }
    let catalog = Catalog::load(&raw);

    let caller = get_calling_app_info();
    tracing::debug!(
        package_name = caller.package_name.as_str(),
        origin = caller.origin.as_str(),
        "matching request"
    );

    match_request_envelope(&request, &catalog);
}
