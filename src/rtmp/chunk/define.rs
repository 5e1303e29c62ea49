//! Chunk-stream constants. Grounded on `chunk/define.go`.

/// Chunk stream id reserved for protocol control messages (set chunk size,
/// abort, ack, window ack size, set peer bandwidth).
pub const CSID_PROTOCOL_CONTROL: u32 = 2;
/// Chunk stream id conventionally used for the `connect`/`createStream`
/// command sequence.
pub const CSID_COMMAND: u32 = 3;
/// Chunk stream id conventionally used for audio/video media messages.
pub const CSID_AUDIO: u32 = 4;
pub const CSID_VIDEO: u32 = 6;

pub const INIT_CHUNK_SIZE: u32 = 128;

pub const FORMAT_0: u8 = 0;
pub const FORMAT_1: u8 = 1;
pub const FORMAT_2: u8 = 2;
pub const FORMAT_3: u8 = 3;
