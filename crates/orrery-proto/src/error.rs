//! Codec errors.

use thiserror::Error;

/// Errors from encoding or decoding documents.
#[derive(Debug, Error)]
pub enum ProtoError {
    /// Record could not be serialized.
    #[error("CBOR encode failed: {0}")]
    Encode(String),

    /// Bytes are not a valid record of the expected type.
    #[error("CBOR decode failed: {0}")]
    Decode(String),

    /// Document exceeds the maximum accepted size.
    #[error("document too large: {size} bytes (max {max})")]
    TooLarge {
        /// Size of the offending document.
        size: usize,
        /// Maximum accepted size.
        max: usize,
    },
}
