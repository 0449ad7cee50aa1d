use thiserror::Error;

/// Catalog decoding errors.
///
/// Never fatal: the loader downgrades any of these to an empty catalog so a
/// corrupt registration cannot take the matcher down.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog cbor decode failed")]
    Cbor(#[from] matcher_cbor::DecodeError),
    #[error("{context} is missing required entry {key:?}")]
    MissingEntry {
        context: &'static str,
        key: &'static str,
    },
    #[error("{context} entry {key:?} has the wrong type")]
    WrongType {
        context: &'static str,
        key: &'static str,
    },
    #[error("credential has neither an mdoc nor an sdjwt projection")]
    NoProjection,
}

/// Request parsing errors.
///
/// Any of these skip the offending request object; the rest of the envelope
/// is still processed.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("request object carries no data")]
    MissingPayload,
    #[error("request json decode failed")]
    Json(#[from] serde_json::Error),
    #[error("base64url decode failed")]
    Base64(#[from] base64::DecodeError),
    #[error("embedded cbor decode failed")]
    Cbor(#[from] matcher_cbor::DecodeError),
    #[error("device request is missing entry {key:?}")]
    MissingEntry { key: &'static str },
    #[error("device request entry {key:?} has the wrong type")]
    WrongType { key: &'static str },
    #[error("signed request is not a three-segment jws")]
    MalformedJws,
    #[error("unsupported protocol {protocol:?}")]
    UnsupportedProtocol { protocol: String },
}
