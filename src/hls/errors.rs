use crate::flv::errors::FlvDemuxerError;
use crate::mpegts::errors::MpegTsError;

#[derive(Debug, thiserror::Error)]
pub enum HlsErrorValue {
    #[error("no support video codec")]
    NoSupportVideoCodec,
    #[error("no support audio codec")]
    NoSupportAudioCodec,
    #[error("flv demux error: {0}")]
    FlvDemuxerError(#[source] FlvDemuxerError),
    #[error("mpegts error: {0}")]
    MpegTsError(#[source] MpegTsError),
    #[error("codec error: {0}")]
    CodecError(String),
    #[error("segment not found: {0}")]
    SegmentNotFound(String),
    #[error("hls player not initialized")]
    NotInitialized,
}

#[derive(Debug, thiserror::Error)]
#[error("{value}")]
pub struct HlsError {
    pub value: HlsErrorValue,
}

impl From<HlsErrorValue> for HlsError {
    fn from(value: HlsErrorValue) -> Self {
        Self { value }
    }
}

impl From<FlvDemuxerError> for HlsError {
    fn from(error: FlvDemuxerError) -> Self {
        Self {
            value: HlsErrorValue::FlvDemuxerError(error),
        }
    }
}

impl From<MpegTsError> for HlsError {
    fn from(error: MpegTsError) -> Self {
        Self {
            value: HlsErrorValue::MpegTsError(error),
        }
    }
}
