#![doc = include_str!("../README.md")]

mod catalog;
mod engine;
mod error;
mod picker;
mod request;

pub use catalog::{Catalog, Claim, Credential};
pub use engine::{match_request_envelope, match_request_envelope_with};
pub use error::{CatalogError, RequestError};
pub use request::{
    EnvelopeItem, MdocRequest, MdocRequestDataElement, OpenId4VpRequest, PROTOCOL_ARF_V2,
    PROTOCOL_MDOC_API, PROTOCOL_MDOC_API_LEGACY, PROTOCOL_OPENID4VP, PROTOCOL_OPENID4VP_V1_SIGNED,
    PROTOCOL_OPENID4VP_V1_UNSIGNED, PROTOCOL_PREVIEW, ParsedRequest, RequestEnvelope,
    decode_base64url, parse_request_item,
};

pub use matcher_macros::credential_matcher;
pub use matcher_tracing as tracing_backend;
