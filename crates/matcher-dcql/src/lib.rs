#![doc = include_str!("../README.md")]

mod engine;
mod models;
mod store;

pub use engine::{
    Combination, CombinationElement, CredentialMatch, DcqlResponse, MAX_COMBINATIONS, OptionMember,
    ResponseSet, SetOption, TooManyCombinations, execute,
};
pub use models::{
    ClaimValue, ClaimsQuery, CredentialQuery, CredentialQueryCommon, CredentialSetQuery, DcqlQuery,
    MdocMeta, SdJwtMeta,
};
pub use store::CredentialStore;
