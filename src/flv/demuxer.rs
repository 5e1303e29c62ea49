//! FLV media tag demuxing into the universal `Packet` type. Grounded on the
//! bitfield layouts in `container/flv/tag.go`, restructured per spec §4.2/
//! §4.6: the demuxer's only job is to recover the polymorphic packet header
//! from the first 1-5 payload bytes. Elementary-stream reframing (AVCC to
//! Annex-B, raw AAC to ADTS) belongs to the HLS source's codec parsers, not
//! here — the demuxer never touches `h264`/`aac`.

use bytes::{Bytes, BytesMut};

use crate::bytesio::bytes_reader::BytesReader;
use crate::channel::packet::{avc_packet_type, sound_format, Packet, PacketHeader, PacketKind};

use super::errors::{DemuxerErrorValue, FlvDemuxerError};
use super::tag::{avc_end_of_sequence, parse_audio_header, parse_video_header, require_non_empty};

pub struct FlvDemuxer;

impl FlvDemuxer {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Demuxes an audio tag body. `strip_payload` controls whether the
    /// header bytes already consumed are removed from the returned
    /// packet's data (`Demux`, used by HLS) or left intact (`DemuxH`, used
    /// by fan-out, whose writers expect the full FLV tag body).
    pub fn demux_audio(
        &self,
        timestamp: u32,
        data: Bytes,
        strip_payload: bool,
    ) -> Result<Packet, FlvDemuxerError> {
        require_non_empty(&data)?;
        let mut reader = BytesReader::new(BytesMut::from(&data[..]));
        let header = parse_audio_header(&mut reader)?;

        let data = if strip_payload {
            Bytes::from(reader.extract_remaining())
        } else {
            data
        };

        Ok(Packet {
            kind: PacketKind::Audio,
            timestamp,
            stream_id: 0,
            header: PacketHeader::Audio(header),
            data,
        })
    }

    /// Demuxes a video tag body, returning the `avc-end-seq` error as a
    /// recoverable skip when byte0==0x17 && byte1==0x02 (spec §4.2).
    pub fn demux_video(
        &self,
        timestamp: u32,
        data: Bytes,
        strip_payload: bool,
    ) -> Result<Packet, FlvDemuxerError> {
        require_non_empty(&data)?;
        if data.len() >= 2 && avc_end_of_sequence(data[0], data[1]) {
            return Err(DemuxerErrorValue::AvcEndSeq.into());
        }

        let mut reader = BytesReader::new(BytesMut::from(&data[..]));
        let header = parse_video_header(&mut reader)?;

        if header.codec_id != crate::channel::packet::codec_id::AVC {
            return Err(DemuxerErrorValue::UnsupportedVideoCodec(header.codec_id).into());
        }
        let _ = avc_packet_type::SEQ_HEADER; // header.avc_packet_type already captured above

        let data = if strip_payload {
            Bytes::from(reader.extract_remaining())
        } else {
            data
        };

        Ok(Packet {
            kind: PacketKind::Video,
            timestamp,
            stream_id: 0,
            header: PacketHeader::Video(header),
            data,
        })
    }

    /// Wraps a metadata (`@setDataFrame`/`onMetaData`) message body as a
    /// packet, never stripping anything — metadata has no fixed header.
    #[must_use]
    pub fn demux_metadata(&self, timestamp: u32, data: Bytes) -> Packet {
        Packet {
            kind: PacketKind::Metadata,
            timestamp,
            stream_id: 0,
            header: PacketHeader::None,
            data,
        }
    }
}

impl Default for FlvDemuxer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demux_strips_header_bytes_when_requested() {
        let demuxer = FlvDemuxer::new();
        let body = Bytes::from_static(&[0xaf, 0x01, 0xde, 0xad]);
        let p = demuxer.demux_audio(0, body, true).unwrap();
        assert_eq!(&p.data[..], &[0xde, 0xad]);
    }

    #[test]
    fn demux_h_preserves_full_payload() {
        let demuxer = FlvDemuxer::new();
        let body = Bytes::from_static(&[0xaf, 0x01, 0xde, 0xad]);
        let p = demuxer.demux_audio(0, body.clone(), false).unwrap();
        assert_eq!(p.data, body);
    }

    #[test]
    fn rejects_non_avc_video_codec() {
        let demuxer = FlvDemuxer::new();
        let body = Bytes::from_static(&[0x12, 0x00]); // codec 2, Sorenson
        let err = demuxer.demux_video(0, body, true).unwrap_err();
        assert!(matches!(err.value, DemuxerErrorValue::UnsupportedVideoCodec(2)));
    }

    #[test]
    fn avc_end_of_sequence_is_a_recoverable_error() {
        let demuxer = FlvDemuxer::new();
        let body = Bytes::from_static(&[0x17, 0x02, 0, 0, 0]);
        let err = demuxer.demux_video(0, body, true).unwrap_err();
        assert!(matches!(err.value, DemuxerErrorValue::AvcEndSeq));
    }
}
