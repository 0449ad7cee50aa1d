#![doc = include_str!("../README.md")]

mod decode;
mod encode;
mod error;
mod item;

pub use decode::{MAX_DEPTH, Token, Visitor, parse, parse_with_visitor};
pub use error::DecodeError;
pub use item::{Item, Map, MapKey};
