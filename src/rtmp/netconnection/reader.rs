//! Parses an AMF0 command message body into `(commandName, transactionId,
//! remainingValues)`. Grounded on `netconnection/reader.go`'s
//! `NetConnectionReader`; `connect`/`createStream`/`publish`/`play` all
//! share this exact tuple shape (spec §4.2).

use bytes::{Bytes, BytesMut};

use crate::amf0::reader::Amf0Reader;
use crate::amf0::value::Amf0Value;
use crate::bytesio::bytes_reader::BytesReader;

use super::errors::{NetConnectionError, NetConnectionErrorValue};

pub struct NetConnectionReader {
    amf0_reader: Amf0Reader,
}

impl NetConnectionReader {
    #[must_use]
    pub fn new() -> Self {
        Self {
            amf0_reader: Amf0Reader::new(),
        }
    }

    /// Decodes `commandName`, `transactionId`, then every remaining AMF0
    /// value in the command payload.
    pub fn read_command(&self, payload: Bytes) -> Result<(String, f64, Vec<Amf0Value>), NetConnectionError> {
        let mut reader = BytesReader::new(BytesMut::from(&payload[..]));

        let command_name = self
            .amf0_reader
            .decode(&mut reader)?
            .as_str()
            .ok_or(NetConnectionErrorValue::CommandNameNotString)?
            .to_string();

        let transaction_id = self
            .amf0_reader
            .decode(&mut reader)?
            .as_f64()
            .unwrap_or(0.0);

        let rest = self.amf0_reader.decode_all(&mut reader)?;

        Ok((command_name, transaction_id, rest))
    }
}

impl Default for NetConnectionReader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amf0::writer::Amf0Writer;
    use crate::bytesio::bytes_writer::BytesWriter;
    use indexmap::IndexMap;

    #[test]
    fn parses_connect_command() {
        let writer = Amf0Writer::new();
        let mut w = BytesWriter::new();
        writer.encode(&mut w, &Amf0Value::String("connect".into())).unwrap();
        writer.encode(&mut w, &Amf0Value::Number(1.0)).unwrap();
        let mut obj = IndexMap::new();
        obj.insert("app".to_string(), Amf0Value::String("live".into()));
        writer.encode(&mut w, &Amf0Value::Object(obj)).unwrap();

        let payload = w.extract_current_bytes().freeze();
        let (name, txid, rest) = NetConnectionReader::new().read_command(payload).unwrap();
        assert_eq!(name, "connect");
        assert_eq!(txid, 1.0);
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].as_object().unwrap().get("app").unwrap().as_str(), Some("live"));
    }
}
