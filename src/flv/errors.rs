use crate::bytesio::bytes_errors::{BytesReadError, BytesWriteError};

#[derive(Debug, thiserror::Error)]
pub enum TagParseErrorValue {
    #[error("bytes read error")]
    BytesReadError(BytesReadError),
    #[error("tag data length error")]
    TagDataLength,
    #[error("unknow tag type error")]
    UnknownTagType,
}
#[derive(Debug, thiserror::Error)]
#[error("{value}")]
pub struct TagParseError {
    pub value: TagParseErrorValue,
}

impl From<BytesReadError> for TagParseError {
    fn from(error: BytesReadError) -> Self {
        Self {
            value: TagParseErrorValue::BytesReadError(error),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{value}")]
pub struct FlvMuxerError {
    pub value: MuxerErrorValue,
}

#[derive(Debug, thiserror::Error)]
pub enum MuxerErrorValue {
    #[error("bytes write error")]
    BytesWriteError(BytesWriteError),
}

impl From<BytesWriteError> for FlvMuxerError {
    fn from(error: BytesWriteError) -> Self {
        Self {
            value: MuxerErrorValue::BytesWriteError(error),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{value}")]
pub struct FlvDemuxerError {
    pub value: DemuxerErrorValue,
}

#[derive(Debug, thiserror::Error)]
pub enum DemuxerErrorValue {
    #[error("bytes read error:{0}")]
    BytesReadError(#[source] BytesReadError),
    #[error("tag data too short")]
    TagDataLength,
    #[error("avc end of sequence")]
    AvcEndSeq,
    #[error("unsupported video codec: {0}")]
    UnsupportedVideoCodec(u8),
    #[error("unsupported audio codec: {0}")]
    UnsupportedAudioCodec(u8),
}

impl From<BytesReadError> for FlvDemuxerError {
    fn from(error: BytesReadError) -> Self {
        Self {
            value: DemuxerErrorValue::BytesReadError(error),
        }
    }
}

impl From<DemuxerErrorValue> for FlvDemuxerError {
    fn from(value: DemuxerErrorValue) -> Self {
        Self { value }
    }
}
