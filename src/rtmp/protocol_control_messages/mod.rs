//! Protocol control messages (RTMP spec 5.4): fixed-shape 4-6 byte bodies
//! carried on chunk stream 2 at msg type ids 1/3/5/6. Grounded on
//! `protocol_control_messages/writer.go`.

pub mod errors;

use byteorder::BigEndian;
use bytes::Bytes;

use crate::bytesio::bytes_writer::BytesWriter;

use errors::ControlMessagesError;

pub struct ControlMessagesWriter;

impl ControlMessagesWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn write_set_chunk_size(&self, chunk_size: u32) -> Result<Bytes, ControlMessagesError> {
        let mut w = BytesWriter::new();
        w.write_u32::<BigEndian>(chunk_size & 0x7fff_ffff)?;
        Ok(w.extract_current_bytes().freeze())
    }

    pub fn write_window_ack_size(&self, size: u32) -> Result<Bytes, ControlMessagesError> {
        let mut w = BytesWriter::new();
        w.write_u32::<BigEndian>(size)?;
        Ok(w.extract_current_bytes().freeze())
    }

    /// `limit_type`: 0=hard, 1=soft, 2=dynamic.
    pub fn write_set_peer_bandwidth(&self, size: u32, limit_type: u8) -> Result<Bytes, ControlMessagesError> {
        let mut w = BytesWriter::new();
        w.write_u32::<BigEndian>(size)?;
        w.write_u8(limit_type)?;
        Ok(w.extract_current_bytes().freeze())
    }

    pub fn write_acknowledgement(&self, sequence_number: u32) -> Result<Bytes, ControlMessagesError> {
        let mut w = BytesWriter::new();
        w.write_u32::<BigEndian>(sequence_number)?;
        Ok(w.extract_current_bytes().freeze())
    }
}

impl Default for ControlMessagesWriter {
    fn default() -> Self {
        Self::new()
    }
}
