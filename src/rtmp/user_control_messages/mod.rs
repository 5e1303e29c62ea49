//! User control messages (RTMP spec 7.1.7, msg type id 4): a 2-byte event
//! type followed by event-specific data. Grounded on
//! `user_control_messages/writer.go`; `StreamBegin` and `StreamIsRecorded`
//! are sent together on the `play` transition (spec §4.3).

pub mod errors;

pub mod event_type {
    pub const STREAM_BEGIN: u16 = 0;
    pub const STREAM_EOF: u16 = 1;
    pub const STREAM_DRY: u16 = 2;
    pub const SET_BUFFER_LENGTH: u16 = 3;
    pub const STREAM_IS_RECORDED: u16 = 4;
    pub const PING_REQUEST: u16 = 6;
    pub const PING_RESPONSE: u16 = 7;
}

use byteorder::BigEndian;
use bytes::Bytes;

use crate::bytesio::bytes_writer::BytesWriter;

use errors::EventMessagesError;

pub struct EventMessagesWriter;

impl EventMessagesWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn write_event(&self, event_type: u16, body: impl Fn(&mut BytesWriter) -> Result<(), EventMessagesError>) -> Result<Bytes, EventMessagesError> {
        let mut w = BytesWriter::new();
        w.write_u16::<BigEndian>(event_type)?;
        body(&mut w)?;
        Ok(w.extract_current_bytes().freeze())
    }

    pub fn write_stream_begin(&self, stream_id: u32) -> Result<Bytes, EventMessagesError> {
        self.write_event(event_type::STREAM_BEGIN, |w| {
            w.write_u32::<BigEndian>(stream_id)?;
            Ok(())
        })
    }

    pub fn write_stream_is_recorded(&self, stream_id: u32) -> Result<Bytes, EventMessagesError> {
        self.write_event(event_type::STREAM_IS_RECORDED, |w| {
            w.write_u32::<BigEndian>(stream_id)?;
            Ok(())
        })
    }

    pub fn write_stream_eof(&self, stream_id: u32) -> Result<Bytes, EventMessagesError> {
        self.write_event(event_type::STREAM_EOF, |w| {
            w.write_u32::<BigEndian>(stream_id)?;
            Ok(())
        })
    }

    pub fn write_set_buffer_length(&self, stream_id: u32, buffer_ms: u32) -> Result<Bytes, EventMessagesError> {
        self.write_event(event_type::SET_BUFFER_LENGTH, |w| {
            w.write_u32::<BigEndian>(stream_id)?;
            w.write_u32::<BigEndian>(buffer_ms)?;
            Ok(())
        })
    }
}

impl Default for EventMessagesWriter {
    fn default() -> Self {
        Self::new()
    }
}
