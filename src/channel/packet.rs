//! The universal packet type carried from RTMP ingress through the fan-out,
//! HLS segmenter, and HTTP-FLV writer. Grounded on `av/pack.go` and
//! `av/av.go`: a tagged union over audio/video/metadata with a polymorphic
//! header record populated by the FLV demuxer.

use bytes::Bytes;

pub mod sound_format {
    pub const MP3: u8 = 2;
    pub const AAC: u8 = 10;
}

pub mod aac_packet_type {
    pub const SEQ_HEADER: u8 = 0;
    pub const RAW: u8 = 1;
}

pub mod codec_id {
    pub const SORENSON: u8 = 2;
    pub const AVC: u8 = 7;
}

pub mod avc_packet_type {
    pub const SEQ_HEADER: u8 = 0;
    pub const NALU: u8 = 1;
    pub const END_OF_SEQUENCE: u8 = 2;
}

pub mod frame_type {
    pub const KEY: u8 = 1;
    pub const INTER: u8 = 2;
    pub const DISPOSABLE_INTER: u8 = 3;
}

/// FLV tag type ids, reused as RTMP message type ids for audio/video/data.
pub mod tag_type {
    pub const AUDIO: u8 = 8;
    pub const VIDEO: u8 = 9;
    pub const SCRIPT_DATA_AMF0: u8 = 18;
    pub const SCRIPT_DATA_AMF3: u8 = 15;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioHeader {
    pub sound_format: u8,
    pub aac_packet_type: u8,
}

impl AudioHeader {
    #[must_use]
    pub const fn is_aac_sequence_header(&self) -> bool {
        self.sound_format == sound_format::AAC && self.aac_packet_type == aac_packet_type::SEQ_HEADER
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VideoHeader {
    pub frame_type: u8,
    pub codec_id: u8,
    pub avc_packet_type: u8,
    /// Signed per the FLV spec; the source reads it as unsigned and
    /// accumulates via left shift (spec §9 open question) — kept as an i32
    /// here since the accumulation in `flv::tag` reproduces the source's
    /// apparent unsigned semantics bit-for-bit before the final cast.
    pub composition_time: i32,
}

impl VideoHeader {
    #[must_use]
    pub const fn is_key_frame(&self) -> bool {
        self.frame_type == frame_type::KEY
    }

    #[must_use]
    pub const fn is_seq(&self) -> bool {
        self.frame_type == frame_type::KEY && self.avc_packet_type == avc_packet_type::SEQ_HEADER
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketHeader {
    Audio(AudioHeader),
    Video(VideoHeader),
    None,
}

impl PacketHeader {
    #[must_use]
    pub const fn as_audio(&self) -> Option<&AudioHeader> {
        match self {
            Self::Audio(h) => Some(h),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_video(&self) -> Option<&VideoHeader> {
        match self {
            Self::Video(h) => Some(h),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Audio,
    Video,
    Metadata,
}

/// The universal media unit. See spec §3: two clone operations (shallow,
/// sharing the payload via `Bytes`'s refcount; deep, copying bytes) with the
/// invariant that once enqueued, payload mutation is forbidden unless the
/// mutator produced its own deep clone.
#[derive(Debug, Clone)]
pub struct Packet {
    pub kind: PacketKind,
    pub timestamp: u32,
    pub stream_id: u32,
    pub header: PacketHeader,
    pub data: Bytes,
}

impl Packet {
    #[must_use]
    pub const fn is_audio(&self) -> bool {
        matches!(self.kind, PacketKind::Audio)
    }

    #[must_use]
    pub const fn is_video(&self) -> bool {
        matches!(self.kind, PacketKind::Video)
    }

    #[must_use]
    pub const fn is_metadata(&self) -> bool {
        matches!(self.kind, PacketKind::Metadata)
    }

    #[must_use]
    pub const fn tag_type(&self) -> u8 {
        match self.kind {
            PacketKind::Video => tag_type::VIDEO,
            PacketKind::Metadata => tag_type::SCRIPT_DATA_AMF0,
            PacketKind::Audio => tag_type::AUDIO,
        }
    }

    /// Cheap clone sharing the payload buffer.
    #[must_use]
    pub fn shallow_clone(&self) -> Self {
        self.clone()
    }

    /// Clone that owns a fresh copy of the payload bytes, permitted to
    /// mutate `data` afterward (e.g. the HLS path replacing the FLV body
    /// with Annex-B/ADTS bytes).
    #[must_use]
    pub fn deep_clone(&self) -> Self {
        let mut p = self.clone();
        p.data = Bytes::copy_from_slice(&self.data);
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deep_clone_owns_independent_bytes() {
        let p = Packet {
            kind: PacketKind::Video,
            timestamp: 0,
            stream_id: 1,
            header: PacketHeader::None,
            data: Bytes::from_static(b"abc"),
        };
        let mut deep = p.deep_clone();
        deep.data = Bytes::from_static(b"xyz");
        assert_eq!(&p.data[..], b"abc");
    }

    #[test]
    fn video_header_seq_requires_key_and_seqhdr() {
        let h = VideoHeader {
            frame_type: frame_type::KEY,
            codec_id: codec_id::AVC,
            avc_packet_type: avc_packet_type::SEQ_HEADER,
            composition_time: 0,
        };
        assert!(h.is_seq());
        assert!(h.is_key_frame());
    }
}
