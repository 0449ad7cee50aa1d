use crate::decode::MAX_DEPTH;
use thiserror::Error;

/// Decoding failure.
///
/// Every variant is terminal for the buffer being decoded; the decoder never
/// resynchronizes after an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The input buffer is empty.
    #[error("input buffer is empty")]
    Empty,
    /// A length field or payload claims more bytes than the buffer holds.
    #[error("need {needed} byte(s) for {field}, have {available}")]
    InsufficientLength {
        field: &'static str,
        needed: u64,
        available: u64,
    },
    /// A compound item ended before all of its declared entries were decoded.
    #[error("not enough entries for {field}")]
    MissingEntries { field: &'static str },
    /// Nesting exceeded [`MAX_DEPTH`] levels.
    #[error("cbor structures nested deeper than {MAX_DEPTH} levels are not supported")]
    DepthExceeded,
    /// Additional-information values 28-30, or an indefinite-length header on
    /// an item type that does not support it.
    #[error("reserved additional information value or unsupported indefinite length item")]
    ReservedAdditionalInfo,
    /// A negative integer below `i64::MIN`.
    #[error("negative integer does not fit in i64")]
    NegativeOutOfRange,
    /// A string length that overflows the signed size type.
    #[error("declared {field} length {length} overflows signed size")]
    LengthOverflow { field: &'static str, length: u64 },
    /// A text string whose payload is not valid UTF-8.
    #[error("text string is not valid utf-8")]
    InvalidUtf8,
    /// A floating-point or simple value other than true/false/null.
    #[error("unsupported floating-point or simple value")]
    UnsupportedSimple,
}
