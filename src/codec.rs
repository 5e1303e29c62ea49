//! Shared contract for the elementary-stream parsers the HLS segmenter
//! hands FLV payload bytes to (spec §1: "expose a fixed `Parse(packet,
//! outputWriter)` and `SampleRate()` contract"). `h264::AvcParser` and
//! `aac::AdtsParser` both implement it.

use bytes::BytesMut;

/// Translates one FLV-framed elementary-stream payload into the bytes the
/// TS muxer expects (Annex-B NALUs for video, ADTS frames for audio),
/// appending the result to `out`.
pub trait CodecParser {
    type Error;

    /// Feeds the codec's sequence descriptor (AVC DCR / AAC ASC) so later
    /// calls to `parse` know how to frame raw frames.
    fn parse_sequence_header(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    fn parse(&mut self, data: &[u8], out: &mut BytesMut) -> Result<(), Self::Error>;

    /// Sample rate in Hz, valid once `parse_sequence_header` has run.
    fn sample_rate(&self) -> u32;
}
