//! CBOR document codec.
//!
//! Documents travel and rest as CBOR. Decoding is bounded by
//! [`MAX_DOCUMENT_SIZE`] so a corrupt or hostile document cannot make the
//! decoder allocate without limit.

use bytes::Bytes;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::ProtoError;

/// Largest document accepted by [`decode`] (256 KiB).
pub const MAX_DOCUMENT_SIZE: usize = 256 * 1024;

/// Encode a record as CBOR.
pub fn encode<T: Serialize>(record: &T) -> Result<Bytes, ProtoError> {
    let mut buf = Vec::new();
    ciborium::ser::into_writer(record, &mut buf).map_err(|e| ProtoError::Encode(e.to_string()))?;
    Ok(Bytes::from(buf))
}

/// Decode a CBOR document.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ProtoError> {
    if bytes.len() > MAX_DOCUMENT_SIZE {
        return Err(ProtoError::TooLarge { size: bytes.len(), max: MAX_DOCUMENT_SIZE });
    }

    ciborium::de::from_reader(bytes).map_err(|e| ProtoError::Decode(e.to_string()))
}
