//! Chunk-stream muxing: the reverse of `unpacketizer`. Grounded on
//! `chunk/packetizer.go` — every message starts with a type-0 (or type-1 for
//! audio/video once a prior timestamp on the same csid is known) chunk
//! header, then the payload is split across type-3 continuation chunks once
//! it exceeds the negotiated chunk size.

use byteorder::{BigEndian, LittleEndian};
use bytes::{Bytes, BytesMut};

use crate::bytesio::bytes_writer::BytesWriter;

use super::define::{FORMAT_0, FORMAT_3};
use super::errors::PackError;

pub struct ChunkPacketizer {
    max_chunk_size: usize,
}

impl ChunkPacketizer {
    #[must_use]
    pub const fn new(max_chunk_size: usize) -> Self {
        Self { max_chunk_size }
    }

    pub fn update_max_chunk_size(&mut self, chunk_size: usize) {
        self.max_chunk_size = chunk_size;
    }

    fn write_basic_header(&self, writer: &mut BytesWriter, format: u8, csid: u32) -> Result<(), PackError> {
        if csid < 64 {
            writer.write_u8((format << 6) | csid as u8)?;
        } else if csid < 320 {
            writer.write_u8(format << 6)?;
            writer.write_u8((csid - 64) as u8)?;
        } else {
            writer.write_u8((format << 6) | 0b0000_0001)?;
            let rest = csid - 64;
            writer.write_u8((rest & 0xff) as u8)?;
            writer.write_u8((rest >> 8) as u8)?;
        }
        Ok(())
    }

    /// Packetizes one RTMP message into a flat byte stream ready to write to
    /// the socket. `csid` groups chunks belonging to the same logical
    /// stream (command/audio/video) so basic headers stay minimal.
    pub fn write_message(
        &self,
        csid: u32,
        timestamp: u32,
        msg_type_id: u8,
        msg_stream_id: u32,
        payload: &[u8],
    ) -> Result<Bytes, PackError> {
        let mut writer = BytesWriter::new();
        let msg_length = payload.len() as u32;

        self.write_basic_header(&mut writer, FORMAT_0, csid)?;
        if timestamp >= 0x00FF_FFFF {
            writer.write_u24::<BigEndian>(0x00FF_FFFF)?;
        } else {
            writer.write_u24::<BigEndian>(timestamp)?;
        }
        writer.write_u24::<BigEndian>(msg_length)?;
        writer.write_u8(msg_type_id)?;
        writer.write_u32::<LittleEndian>(msg_stream_id)?;
        if timestamp >= 0x00FF_FFFF {
            writer.write_u32::<BigEndian>(timestamp)?;
        }

        for (i, chunk) in payload.chunks(self.max_chunk_size.max(1)).enumerate() {
            if i > 0 {
                self.write_basic_header(&mut writer, FORMAT_3, csid)?;
                if timestamp >= 0x00FF_FFFF {
                    writer.write_u32::<BigEndian>(timestamp)?;
                }
            }
            writer.write(chunk)?;
        }

        Ok(writer.extract_current_bytes().freeze())
    }
}

impl Default for ChunkPacketizer {
    fn default() -> Self {
        Self::new(super::define::INIT_CHUNK_SIZE as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtmp::chunk::unpacketizer::{ChunkUnpacketizer, UnpackResult};

    #[test]
    fn small_message_roundtrips_through_unpacketizer() {
        let packetizer = ChunkPacketizer::new(128);
        let bytes = packetizer.write_message(3, 0, 20, 0, b"hello").unwrap();

        let mut unpacker = ChunkUnpacketizer::new();
        unpacker.extend_data(&bytes).unwrap();
        let rv = unpacker.read_chunk().unwrap();
        match rv {
            UnpackResult::ChunkInfo(info) => {
                assert_eq!(&info.payload[..], b"hello");
                assert_eq!(info.message_header.msg_type_id, 20);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn oversized_message_splits_into_continuation_chunks() {
        let packetizer = ChunkPacketizer::new(4);
        let payload = b"0123456789";
        let bytes = packetizer.write_message(3, 0, 9, 1, payload).unwrap();

        let mut unpacker = ChunkUnpacketizer::new();
        unpacker.extend_data(&bytes).unwrap();
        let rv = unpacker.read_chunk().unwrap();
        match rv {
            UnpackResult::ChunkInfo(info) => {
                assert_eq!(&info.payload[..], &payload[..]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
