use super::errors::{Amf0WriteError, Amf0WriteErrorValue};
use super::value::Amf0Value;
use crate::bytesio::BytesWriter;
use byteorder::BigEndian;

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

const NORMAL_STRING_MAX: usize = u16::MAX as usize;

/// Encodes AMF0 values. The engine only ever emits AMF0 (§6), so there is
/// no AMF3 encode path.
#[derive(Debug, Default)]
pub struct Amf0Writer;

impl Amf0Writer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn encode(&self, w: &mut BytesWriter, v: &Amf0Value) -> Result<(), Amf0WriteError> {
        match v {
            Amf0Value::Number(n) => {
                w.write_u8(MARKER_NUMBER)?;
                w.write_f64::<BigEndian>(*n)?;
            }
            Amf0Value::Boolean(b) => {
                w.write_u8(MARKER_BOOLEAN)?;
                w.write_u8(u8::from(*b))?;
            }
            Amf0Value::String(s) => {
                w.write_u8(MARKER_STRING)?;
                self.encode_utf8(w, s)?;
            }
            Amf0Value::LongString(s) => {
                w.write_u8(MARKER_LONG_STRING)?;
                self.encode_long_utf8(w, s)?;
            }
            Amf0Value::Object(map) => {
                w.write_u8(MARKER_OBJECT)?;
                self.encode_object_body(w, map)?;
            }
            Amf0Value::EcmaArray(map) => {
                w.write_u8(MARKER_ECMA_ARRAY)?;
                w.write_u32::<BigEndian>(map.len() as u32)?;
                self.encode_object_body(w, map)?;
            }
            Amf0Value::StrictArray(items) => {
                w.write_u8(MARKER_STRICT_ARRAY)?;
                w.write_u32::<BigEndian>(items.len() as u32)?;
                for item in items {
                    self.encode(w, item)?;
                }
            }
            Amf0Value::Null => w.write_u8(MARKER_NULL)?,
            Amf0Value::Undefined => w.write_u8(MARKER_UNDEFINED)?,
            Amf0Value::Date { unix_ms, tz } => {
                w.write_u8(MARKER_DATE)?;
                w.write_f64::<BigEndian>(*unix_ms)?;
                w.write_u16::<BigEndian>(*tz as u16)?;
            }
        }
        Ok(())
    }

    fn encode_utf8(&self, w: &mut BytesWriter, s: &str) -> Result<(), Amf0WriteError> {
        if s.len() > NORMAL_STRING_MAX {
            return Err(Amf0WriteErrorValue::NormalStringTooLong.into());
        }
        w.write_u16::<BigEndian>(s.len() as u16)?;
        w.write(s.as_bytes())?;
        Ok(())
    }

    fn encode_long_utf8(&self, w: &mut BytesWriter, s: &str) -> Result<(), Amf0WriteError> {
        w.write_u32::<BigEndian>(s.len() as u32)?;
        w.write(s.as_bytes())?;
        Ok(())
    }

    fn encode_object_body(
        &self,
        w: &mut BytesWriter,
        map: &indexmap::IndexMap<String, Amf0Value>,
    ) -> Result<(), Amf0WriteError> {
        for (k, v) in map {
            self.encode_utf8(w, k)?;
            self.encode(w, v)?;
        }
        self.encode_utf8(w, "")?;
        w.write_u8(MARKER_OBJECT_END)?;
        Ok(())
    }
}
