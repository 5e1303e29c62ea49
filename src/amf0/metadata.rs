//! The `@setDataFrame` prefix convention used by FLV/RTMP metadata messages
//! (`onMetaData`). Grounded on the ADD/DEL reform in the upstream Go
//! `protocol/amf/metadata.go`: metadata payloads are canonically prefixed
//! with an AMF0-encoded `"@setDataFrame"` string; ADD ensures the prefix is
//! present, DEL strips it.

use super::errors::{Amf0ReadError, Amf0ReadErrorValue};
use super::reader::Amf0Reader;
use super::writer::Amf0Writer;
use super::value::Amf0Value;
use crate::bytesio::{BytesReader, BytesWriter};
use bytes::Bytes;

pub const SET_DATA_FRAME: &str = "@setDataFrame";
pub const ON_METADATA: &str = "onMetaData";

fn set_data_frame_prefix() -> Bytes {
    let mut w = BytesWriter::new();
    Amf0Writer::new()
        .encode(&mut w, &Amf0Value::String(SET_DATA_FRAME.to_string()))
        .expect("encoding a short string never fails");
    w.extract_current_bytes().freeze()
}

/// Adds the `@setDataFrame` prefix if the payload's first AMF0 value is not
/// already that string.
pub fn add_prefix(payload: &[u8]) -> Result<Bytes, Amf0ReadError> {
    let mut r = BytesReader::from_bytes(Bytes::copy_from_slice(payload));
    let first = Amf0Reader::new().decode(&mut r)?;
    match first.as_str() {
        Some(SET_DATA_FRAME) => Ok(Bytes::copy_from_slice(payload)),
        Some(_) => {
            let prefix = set_data_frame_prefix();
            let mut out = Vec::with_capacity(prefix.len() + payload.len());
            out.extend_from_slice(&prefix);
            out.extend_from_slice(payload);
            Ok(Bytes::from(out))
        }
        None => Err(Amf0ReadErrorValue::WrongType.into()),
    }
}

/// Strips a leading `@setDataFrame` prefix if present.
pub fn strip_prefix(payload: &[u8]) -> Result<Bytes, Amf0ReadError> {
    let mut r = BytesReader::from_bytes(Bytes::copy_from_slice(payload));
    let first = Amf0Reader::new().decode(&mut r)?;
    match first.as_str() {
        Some(SET_DATA_FRAME) => {
            let consumed = payload.len() - r.len();
            Ok(Bytes::copy_from_slice(&payload[consumed..]))
        }
        Some(_) => Ok(Bytes::copy_from_slice(payload)),
        None => Err(Amf0ReadErrorValue::WrongType.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_str(s: &str) -> Bytes {
        let mut w = BytesWriter::new();
        Amf0Writer::new()
            .encode(&mut w, &Amf0Value::String(s.to_string()))
            .unwrap();
        w.extract_current_bytes().freeze()
    }

    #[test]
    fn add_prefix_is_idempotent() {
        let onmeta = encode_str(ON_METADATA);
        let added = add_prefix(&onmeta).unwrap();
        let added_again = add_prefix(&added).unwrap();
        assert_eq!(added, added_again);
    }

    #[test]
    fn strip_then_add_roundtrips() {
        let onmeta = encode_str(ON_METADATA);
        let added = add_prefix(&onmeta).unwrap();
        let stripped = strip_prefix(&added).unwrap();
        assert_eq!(stripped, onmeta);
    }

    #[test]
    fn strip_without_prefix_is_noop() {
        let onmeta = encode_str(ON_METADATA);
        let stripped = strip_prefix(&onmeta).unwrap();
        assert_eq!(stripped, onmeta);
    }
}
