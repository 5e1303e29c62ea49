//! Builds the AMF0 command-message bodies sent back to the client:
//! `connect`'s `_result`, `createStream`'s `_result`, and the `onStatus`
//! replies to `publish`/`play`. Grounded on `netconnection/writer.go`.

use bytes::Bytes;
use indexmap::IndexMap;

use crate::amf0::value::Amf0Value;
use crate::amf0::writer::Amf0Writer;
use crate::bytesio::bytes_writer::BytesWriter;

use super::errors::NetConnectionError;

pub struct NetConnectionWriter {
    amf0_writer: Amf0Writer,
}

impl NetConnectionWriter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            amf0_writer: Amf0Writer::new(),
        }
    }

    fn encode_all(&self, values: &[Amf0Value]) -> Result<Bytes, NetConnectionError> {
        let mut w = BytesWriter::new();
        for v in values {
            self.amf0_writer.encode(&mut w, v)?;
        }
        Ok(w.extract_current_bytes().freeze())
    }

    /// `connect`'s success reply: `_result(transactionId, properties, information)`.
    pub fn write_connect_response(&self, transaction_id: f64) -> Result<Bytes, NetConnectionError> {
        let mut properties = IndexMap::new();
        properties.insert("fmsVer".to_string(), Amf0Value::String("FMS/3,0,1,123".into()));
        properties.insert("capabilities".to_string(), Amf0Value::Number(31.0));

        let mut information = IndexMap::new();
        information.insert("level".to_string(), Amf0Value::String("status".into()));
        information.insert("code".to_string(), Amf0Value::String("NetConnection.Connect.Success".into()));
        information.insert("description".to_string(), Amf0Value::String("Connection succeeded.".into()));
        information.insert("objectEncoding".to_string(), Amf0Value::Number(0.0));

        self.encode_all(&[
            Amf0Value::String("_result".into()),
            Amf0Value::Number(transaction_id),
            Amf0Value::Object(properties),
            Amf0Value::Object(information),
        ])
    }

    /// `createStream`'s success reply: `_result(transactionId, null, streamId)`.
    pub fn write_create_stream_response(&self, transaction_id: f64, stream_id: f64) -> Result<Bytes, NetConnectionError> {
        self.encode_all(&[
            Amf0Value::String("_result".into()),
            Amf0Value::Number(transaction_id),
            Amf0Value::Null,
            Amf0Value::Number(stream_id),
        ])
    }

    /// A generic `onStatus(0, null, {level, code, description})` reply used
    /// for `publish`/`play`/`unpublish`/errors.
    pub fn write_on_status(&self, level: &str, code: &str, description: &str) -> Result<Bytes, NetConnectionError> {
        let mut info = IndexMap::new();
        info.insert("level".to_string(), Amf0Value::String(level.into()));
        info.insert("code".to_string(), Amf0Value::String(code.into()));
        info.insert("description".to_string(), Amf0Value::String(description.into()));

        self.encode_all(&[
            Amf0Value::String("onStatus".into()),
            Amf0Value::Number(0.0),
            Amf0Value::Null,
            Amf0Value::Object(info),
        ])
    }
}

impl Default for NetConnectionWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf0::reader::Amf0Reader;
    use crate::bytesio::bytes_reader::BytesReader;
    use bytes::BytesMut;

    #[test]
    fn connect_response_decodes_back_to_result() {
        let bytes = NetConnectionWriter::new().write_connect_response(1.0).unwrap();
        let mut r = BytesReader::new(BytesMut::from(&bytes[..]));
        let vals = Amf0Reader::new().decode_all(&mut r).unwrap();
        assert_eq!(vals[0].as_str(), Some("_result"));
        assert_eq!(vals[1].as_f64(), Some(1.0));
    }

    #[test]
    fn on_status_carries_the_given_code() {
        let bytes = NetConnectionWriter::new()
            .write_on_status("status", "NetStream.Publish.Start", "ok")
            .unwrap();
        let mut r = BytesReader::new(BytesMut::from(&bytes[..]));
        let vals = Amf0Reader::new().decode_all(&mut r).unwrap();
        let info = vals[3].as_object().unwrap();
        assert_eq!(info.get("code").unwrap().as_str(), Some("NetStream.Publish.Start"));
    }
}
