//! FLV tag muxing for the HTTP-FLV writer path. Grounded on
//! `container/flv/writer.go`'s `Writer.Write`: a 9-byte file header emitted
//! once, then a `PreviousTagSize0 = 0` placeholder, then one
//! `{type, dataSize, timestamp, timestampExt, streamId, data, prevTagSize}`
//! record per packet.

use byteorder::BigEndian;
use bytes::{Bytes, BytesMut};

use crate::bytesio::bytes_writer::BytesWriter;
use crate::channel::packet::{tag_type, Packet, PacketKind};

use super::errors::FlvMuxerError;

pub const FLV_HEADER: [u8; 9] = [0x46, 0x4c, 0x56, 0x01, 0x05, 0x00, 0x00, 0x00, 0x09];
pub const HEADER_LENGTH: usize = FLV_HEADER.len();

pub struct FlvMuxer {
    header_written: bool,
}

impl FlvMuxer {
    #[must_use]
    pub const fn new() -> Self {
        Self { header_written: false }
    }

    /// Writes the FLV file header and the first `PreviousTagSize0`
    /// placeholder if this is the first call.
    pub fn write_flv_header(&mut self, writer: &mut BytesWriter) -> Result<(), FlvMuxerError> {
        if self.header_written {
            return Ok(());
        }
        writer.write(&FLV_HEADER)?;
        writer.write_u32::<BigEndian>(0)?;
        self.header_written = true;
        Ok(())
    }

    /// Muxes one packet into a full FLV tag (header + body + trailing
    /// `PreviousTagSize`), writing the file header first on the initial
    /// call.
    pub fn write_tag(&mut self, packet: &Packet, writer: &mut BytesWriter) -> Result<(), FlvMuxerError> {
        self.write_flv_header(writer)?;

        let type_id = match packet.kind {
            PacketKind::Audio => tag_type::AUDIO,
            PacketKind::Video => tag_type::VIDEO,
            PacketKind::Metadata => tag_type::SCRIPT_DATA_AMF0,
        };

        let data_len = packet.data.len() as u32;
        writer.write_u8(type_id)?;
        writer.write_u24::<BigEndian>(data_len)?;
        writer.write_u24::<BigEndian>(packet.timestamp & 0x00ff_ffff)?;
        writer.write_u8(((packet.timestamp >> 24) & 0xff) as u8)?;
        writer.write_u24::<BigEndian>(0)?;
        writer.write(&packet.data)?;
        writer.write_u32::<BigEndian>(data_len + 11)?;
        Ok(())
    }

    /// Convenience entry point returning a fresh buffer containing just
    /// this tag (plus the file header on first use).
    pub fn mux(&mut self, packet: &Packet) -> Result<Bytes, FlvMuxerError> {
        let mut writer = BytesWriter::new();
        self.write_tag(packet, &mut writer)?;
        Ok(writer.extract_current_bytes().freeze())
    }
}

impl Default for FlvMuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::packet::PacketHeader;

    #[test]
    fn first_tag_includes_flv_header() {
        let mut muxer = FlvMuxer::new();
        let packet = Packet {
            kind: PacketKind::Video,
            timestamp: 0,
            stream_id: 1,
            header: PacketHeader::None,
            data: Bytes::from_static(b"x"),
        };
        let out = muxer.mux(&packet).unwrap();
        assert!(out.starts_with(&FLV_HEADER));
    }

    #[test]
    fn second_tag_does_not_repeat_flv_header() {
        let mut muxer = FlvMuxer::new();
        let packet = Packet {
            kind: PacketKind::Audio,
            timestamp: 0,
            stream_id: 1,
            header: PacketHeader::None,
            data: Bytes::from_static(b"y"),
        };
        let mut writer = BytesWriter::new();
        muxer.write_tag(&packet, &mut writer).unwrap();
        muxer.write_tag(&packet, &mut writer).unwrap();
        let out = writer.get_current_bytes();
        assert_eq!(out.iter().filter(|&&b| b == 0x46).count() >= 1, true);
        assert!(out.len() > HEADER_LENGTH + 4);
    }
}
