use super::errors::{Amf0ReadError, Amf0ReadErrorValue};
use super::value::Amf0Value;
use crate::bytesio::BytesReader;
use byteorder::BigEndian;
use indexmap::IndexMap;

const MARKER_NUMBER: u8 = 0x00;
const MARKER_BOOLEAN: u8 = 0x01;
const MARKER_STRING: u8 = 0x02;
const MARKER_OBJECT: u8 = 0x03;
const MARKER_NULL: u8 = 0x05;
const MARKER_UNDEFINED: u8 = 0x06;
const MARKER_ECMA_ARRAY: u8 = 0x08;
const MARKER_OBJECT_END: u8 = 0x09;
const MARKER_STRICT_ARRAY: u8 = 0x0A;
const MARKER_DATE: u8 = 0x0B;
const MARKER_LONG_STRING: u8 = 0x0C;

const MAX_STRING_LEN: usize = 64 * 1024 * 1024;

/// Decodes AMF0 values from a byte cursor. One call to `decode` consumes
/// exactly one value; callers loop to decode the full command-message tuple
/// `(commandName, transactionId, commandObject, ...args)`.
#[derive(Debug, Default)]
pub struct Amf0Reader;

impl Amf0Reader {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn decode(&self, r: &mut BytesReader) -> Result<Amf0Value, Amf0ReadError> {
        let marker = r.read_u8()?;
        self.decode_with_marker(r, marker)
    }

    fn decode_with_marker(
        &self,
        r: &mut BytesReader,
        marker: u8,
    ) -> Result<Amf0Value, Amf0ReadError> {
        match marker {
            MARKER_NUMBER => Ok(Amf0Value::Number(r.read_f64::<BigEndian>()?)),
            MARKER_BOOLEAN => Ok(Amf0Value::Boolean(r.read_u8()? != 0)),
            MARKER_STRING => Ok(Amf0Value::String(self.decode_utf8(r)?)),
            MARKER_OBJECT => Ok(Amf0Value::Object(self.decode_object_body(r)?)),
            MARKER_NULL => Ok(Amf0Value::Null),
            MARKER_UNDEFINED => Ok(Amf0Value::Undefined),
            MARKER_ECMA_ARRAY => {
                // 4-byte approximate element count, not authoritative; we
                // still read until the terminator like a plain object.
                let _count = r.read_u32::<BigEndian>()?;
                Ok(Amf0Value::EcmaArray(self.decode_object_body(r)?))
            }
            MARKER_STRICT_ARRAY => {
                let count = r.read_u32::<BigEndian>()?;
                let mut items = Vec::with_capacity(count as usize);
                for _ in 0..count {
                    items.push(self.decode(r)?);
                }
                Ok(Amf0Value::StrictArray(items))
            }
            MARKER_DATE => {
                let unix_ms = r.read_f64::<BigEndian>()?;
                let tz = r.read_u16::<BigEndian>()? as i16;
                Ok(Amf0Value::Date { unix_ms, tz })
            }
            MARKER_LONG_STRING => Ok(Amf0Value::LongString(self.decode_long_utf8(r)?)),
            other => Err(Amf0ReadErrorValue::UnknownMarker { marker: other }.into()),
        }
    }

    /// Decodes exactly one value without an AMF0 marker byte, used where the
    /// caller already knows the type (metadata key inspection).
    pub fn decode_utf8(&self, r: &mut BytesReader) -> Result<String, Amf0ReadError> {
        let len = r.read_u16::<BigEndian>()? as usize;
        if len > MAX_STRING_LEN {
            return Err(Amf0ReadErrorValue::StringTooLong {
                length: len,
                max: MAX_STRING_LEN,
            }
            .into());
        }
        let bytes = r.read_bytes(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn decode_long_utf8(&self, r: &mut BytesReader) -> Result<String, Amf0ReadError> {
        let len = r.read_u32::<BigEndian>()? as usize;
        if len > MAX_STRING_LEN {
            return Err(Amf0ReadErrorValue::StringTooLong {
                length: len,
                max: MAX_STRING_LEN,
            }
            .into());
        }
        let bytes = r.read_bytes(len)?;
        Ok(String::from_utf8(bytes.to_vec())?)
    }

    fn decode_object_body(
        &self,
        r: &mut BytesReader,
    ) -> Result<IndexMap<String, Amf0Value>, Amf0ReadError> {
        let mut map = IndexMap::new();
        loop {
            let key = self.decode_utf8(r)?;
            let marker = r.peek_u8()?;
            if key.is_empty() && marker == MARKER_OBJECT_END {
                r.read_u8()?;
                break;
            }
            let value = self.decode(r)?;
            map.insert(key, value);
        }
        Ok(map)
    }

    /// Decodes every value remaining in `r`, used for the top-level command
    /// message tuple where the count is not known up front.
    pub fn decode_all(&self, r: &mut BytesReader) -> Result<Vec<Amf0Value>, Amf0ReadError> {
        let mut out = Vec::new();
        while !r.is_empty() {
            out.push(self.decode(r)?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf0::writer::Amf0Writer;

    fn roundtrip(v: &Amf0Value) -> Amf0Value {
        let mut w = crate::bytesio::BytesWriter::new();
        Amf0Writer::new().encode(&mut w, v).unwrap();
        let bytes = w.extract_current_bytes().freeze();
        let mut r = BytesReader::from_bytes(bytes);
        Amf0Reader::new().decode(&mut r).unwrap()
    }

    #[test]
    fn roundtrips_number() {
        assert_eq!(roundtrip(&Amf0Value::Number(3.14159)), Amf0Value::Number(3.14159));
    }

    #[test]
    fn roundtrips_string() {
        assert_eq!(
            roundtrip(&Amf0Value::String("a pup!".into())),
            Amf0Value::String("a pup!".into())
        );
        assert_eq!(
            roundtrip(&Amf0Value::String("日本語".into())),
            Amf0Value::String("日本語".into())
        );
    }

    #[test]
    fn roundtrips_bool_null() {
        assert_eq!(roundtrip(&Amf0Value::Boolean(true)), Amf0Value::Boolean(true));
        assert_eq!(roundtrip(&Amf0Value::Null), Amf0Value::Null);
    }

    #[test]
    fn roundtrips_object() {
        let mut obj = IndexMap::new();
        obj.insert("app".to_string(), Amf0Value::String("live".into()));
        obj.insert("objectEncoding".to_string(), Amf0Value::Number(0.0));
        let v = Amf0Value::Object(obj);
        assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn roundtrips_strict_array() {
        let v = Amf0Value::StrictArray(vec![
            Amf0Value::Number(1.0),
            Amf0Value::Number(2.0),
            Amf0Value::String("x".into()),
        ]);
        assert_eq!(roundtrip(&v), v);
    }

    #[test]
    fn decode_all_reads_command_tuple() {
        let mut w = crate::bytesio::BytesWriter::new();
        let writer = Amf0Writer::new();
        writer.encode(&mut w, &Amf0Value::String("connect".into())).unwrap();
        writer.encode(&mut w, &Amf0Value::Number(1.0)).unwrap();
        let bytes = w.extract_current_bytes().freeze();
        let mut r = BytesReader::from_bytes(bytes);
        let vals = Amf0Reader::new().decode_all(&mut r).unwrap();
        assert_eq!(vals.len(), 2);
        assert_eq!(vals[0].as_str(), Some("connect"));
    }
}
