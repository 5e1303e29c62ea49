//! Classifies a completed `ChunkInfo` into the handful of message shapes the
//! session state machine cares about. Grounded on `messages/parser.go`.

pub mod define;
pub mod errors;

use byteorder::BigEndian;
use bytes::Bytes;

use super::chunk::ChunkInfo;
use define::msg_type_id;
use errors::{MessageError, MessageErrorValue};

use crate::bytesio::bytes_reader::BytesReader;

#[derive(Debug)]
pub enum RtmpMessage {
    SetChunkSize(u32),
    WindowAckSize(u32),
    SetPeerBandwidth { size: u32, limit_type: u8 },
    Acknowledgement(u32),
    Amf0Command { timestamp: u32, payload: Bytes },
    Amf0Data { timestamp: u32, payload: Bytes },
    Audio { timestamp: u32, payload: Bytes },
    Video { timestamp: u32, payload: Bytes },
    Unknown { msg_type_id: u8 },
}

pub fn classify(chunk: ChunkInfo) -> Result<RtmpMessage, MessageError> {
    let timestamp = chunk.message_header.timestamp;
    let payload = Bytes::from(chunk.payload);

    match chunk.message_header.msg_type_id {
        msg_type_id::SET_CHUNK_SIZE => {
            let mut r = BytesReader::from_bytes(payload);
            let size = r.read_u32::<BigEndian>().map_err(MessageErrorValue::BytesReadError)?;
            Ok(RtmpMessage::SetChunkSize(size & 0x7fff_ffff))
        }
        msg_type_id::WIN_ACK_SIZE => {
            let mut r = BytesReader::from_bytes(payload);
            let size = r.read_u32::<BigEndian>().map_err(MessageErrorValue::BytesReadError)?;
            Ok(RtmpMessage::WindowAckSize(size))
        }
        msg_type_id::SET_PEER_BANDWIDTH => {
            let mut r = BytesReader::from_bytes(payload);
            let size = r.read_u32::<BigEndian>().map_err(MessageErrorValue::BytesReadError)?;
            let limit_type = r.read_u8().map_err(MessageErrorValue::BytesReadError)?;
            Ok(RtmpMessage::SetPeerBandwidth { size, limit_type })
        }
        msg_type_id::ACKNOWLEDGEMENT => {
            let mut r = BytesReader::from_bytes(payload);
            let size = r.read_u32::<BigEndian>().map_err(MessageErrorValue::BytesReadError)?;
            Ok(RtmpMessage::Acknowledgement(size))
        }
        msg_type_id::COMMAND_AMF0 => Ok(RtmpMessage::Amf0Command { timestamp, payload }),
        msg_type_id::DATA_AMF0 => Ok(RtmpMessage::Amf0Data { timestamp, payload }),
        msg_type_id::AUDIO => Ok(RtmpMessage::Audio { timestamp, payload }),
        msg_type_id::VIDEO => Ok(RtmpMessage::Video { timestamp, payload }),
        other => Ok(RtmpMessage::Unknown { msg_type_id: other }),
    }
}
