//! Minimal AMF3 *decode* support. Per the external interface contract
//! (spec §6): "AMF3 is accepted in decode but the engine emits AMF0." This
//! covers the marker subset RTMP command messages (type id 17) actually
//! use; full AMF3 trait/object externalization is not implemented since
//! nothing in this engine produces it.

use super::errors::{Amf0ReadError, Amf0ReadErrorValue};
use super::value::Amf0Value;
use crate::bytesio::BytesReader;
use byteorder::BigEndian;

const MARKER_UNDEFINED: u8 = 0x00;
const MARKER_NULL: u8 = 0x01;
const MARKER_FALSE: u8 = 0x02;
const MARKER_TRUE: u8 = 0x03;
const MARKER_INTEGER: u8 = 0x04;
const MARKER_DOUBLE: u8 = 0x05;
const MARKER_STRING: u8 = 0x06;
const MARKER_DATE: u8 = 0x08;
const MARKER_ARRAY: u8 = 0x09;
const MARKER_BYTE_ARRAY: u8 = 0x0C;

/// Reads a U29 variable-length integer as used throughout AMF3 for
/// lengths and the integer type itself.
fn read_u29(r: &mut BytesReader) -> Result<u32, Amf0ReadError> {
    let mut result: u32 = 0;
    for i in 0..4 {
        let byte = r.read_u8()?;
        if i == 3 {
            result = (result << 8) | u32::from(byte);
            break;
        }
        result = (result << 7) | u32::from(byte & 0x7F);
        if byte & 0x80 == 0 {
            break;
        }
    }
    Ok(result)
}

fn read_u29_string(r: &mut BytesReader) -> Result<String, Amf0ReadError> {
    let header = read_u29(r)?;
    let len = (header >> 1) as usize;
    let bytes = r.read_bytes(len)?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

pub fn decode(r: &mut BytesReader) -> Result<Amf0Value, Amf0ReadError> {
    let marker = r.read_u8()?;
    match marker {
        MARKER_UNDEFINED => Ok(Amf0Value::Undefined),
        MARKER_NULL => Ok(Amf0Value::Null),
        MARKER_FALSE => Ok(Amf0Value::Boolean(false)),
        MARKER_TRUE => Ok(Amf0Value::Boolean(true)),
        MARKER_INTEGER => {
            let raw = read_u29(r)?;
            // U29 is a 29-bit two's complement value.
            let signed = if raw & 0x1000_0000 != 0 {
                (raw as i32) - (1 << 29)
            } else {
                raw as i32
            };
            Ok(Amf0Value::Number(f64::from(signed)))
        }
        MARKER_DOUBLE => Ok(Amf0Value::Number(r.read_f64::<BigEndian>()?)),
        MARKER_STRING => Ok(Amf0Value::String(read_u29_string(r)?)),
        MARKER_DATE => {
            let header = read_u29(r)?;
            if header & 1 == 0 {
                // reference to a previously-seen date; not tracked, treat as 0.
                return Ok(Amf0Value::Date { unix_ms: 0.0, tz: 0 });
            }
            let unix_ms = r.read_f64::<BigEndian>()?;
            Ok(Amf0Value::Date { unix_ms, tz: 0 })
        }
        MARKER_ARRAY => {
            let header = read_u29(r)?;
            if header & 1 == 0 {
                return Ok(Amf0Value::StrictArray(Vec::new()));
            }
            let count = (header >> 1) as usize;
            // dense-array key (empty string terminator for associative part)
            loop {
                let key = read_u29_string(r)?;
                if key.is_empty() {
                    break;
                }
                decode(r)?; // associative values are dropped; RTMP doesn't use them
            }
            let mut items = Vec::with_capacity(count);
            for _ in 0..count {
                items.push(decode(r)?);
            }
            Ok(Amf0Value::StrictArray(items))
        }
        MARKER_BYTE_ARRAY => {
            let header = read_u29(r)?;
            if header & 1 == 0 {
                return Ok(Amf0Value::String(String::new()));
            }
            let len = (header >> 1) as usize;
            let bytes = r.read_bytes(len)?;
            Ok(Amf0Value::String(
                String::from_utf8_lossy(&bytes).into_owned(),
            ))
        }
        other => Err(Amf0ReadErrorValue::UnknownMarker { marker: other }.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn decodes_integer() {
        let mut r = BytesReader::from_bytes(Bytes::from_static(&[MARKER_INTEGER, 0x7F]));
        assert_eq!(decode(&mut r).unwrap(), Amf0Value::Number(127.0));
    }

    #[test]
    fn decodes_boolean() {
        let mut r = BytesReader::from_bytes(Bytes::from_static(&[MARKER_TRUE]));
        assert_eq!(decode(&mut r).unwrap(), Amf0Value::Boolean(true));
    }

    #[test]
    fn decodes_string() {
        // U29 header for length 5 is (5<<1)|1 = 11 = 0x0B
        let mut bytes = vec![MARKER_STRING, 0x0B];
        bytes.extend_from_slice(b"hello");
        let mut r = BytesReader::from_bytes(Bytes::from(bytes));
        assert_eq!(decode(&mut r).unwrap(), Amf0Value::String("hello".into()));
    }
}
