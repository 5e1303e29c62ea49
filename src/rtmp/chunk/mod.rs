pub mod define;
pub mod errors;
pub mod packetizer;
pub mod unpacketizer;

use bytes::BytesMut;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtendTimestampType {
    NONE,
    FORMAT0,
    FORMAT12,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ChunkBasicHeader {
    pub format: u8,
    pub chunk_stream_id: u32,
}

impl ChunkBasicHeader {
    #[must_use]
    pub const fn new(format: u8, chunk_stream_id: u32) -> Self {
        Self { format, chunk_stream_id }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkMessageHeader {
    pub timestamp: u32,
    pub timestamp_delta: u32,
    pub msg_length: u32,
    pub msg_type_id: u8,
    pub msg_streamd_id: u32,
    pub extended_timestamp_type: ExtendTimestampType,
}

impl Default for ChunkMessageHeader {
    fn default() -> Self {
        Self {
            timestamp: 0,
            timestamp_delta: 0,
            msg_length: 0,
            msg_type_id: 0,
            msg_streamd_id: 0,
            extended_timestamp_type: ExtendTimestampType::NONE,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkInfo {
    pub basic_header: ChunkBasicHeader,
    pub message_header: ChunkMessageHeader,
    pub payload: BytesMut,
}

impl ChunkInfo {
    #[must_use]
    pub fn new(
        chunk_stream_id: u32,
        format: u8,
        timestamp: u32,
        msg_length: u32,
        msg_type_id: u8,
        msg_streamd_id: u32,
        payload: BytesMut,
    ) -> Self {
        Self {
            basic_header: ChunkBasicHeader::new(format, chunk_stream_id),
            message_header: ChunkMessageHeader {
                timestamp,
                timestamp_delta: 0,
                msg_length,
                msg_type_id,
                msg_streamd_id,
                extended_timestamp_type: ExtendTimestampType::NONE,
            },
            payload,
        }
    }
}

impl Default for ExtendTimestampType {
    fn default() -> Self {
        Self::NONE
    }
}
