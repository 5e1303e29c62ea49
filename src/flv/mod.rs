pub mod demuxer;
pub mod errors;
pub mod muxer;
pub mod tag;

pub use demuxer::FlvDemuxer;
pub use errors::{FlvDemuxerError, FlvMuxerError, TagParseError};
pub use muxer::{FlvMuxer, FLV_HEADER, HEADER_LENGTH};
