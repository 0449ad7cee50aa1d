#![doc = include_str!("../README.md")]

mod abi;
mod host;
mod input;
mod traits;

pub use host::*;
pub use input::*;
pub use traits::*;

#[cfg(not(target_arch = "wasm32"))]
pub use credman_sys::test_shim;
