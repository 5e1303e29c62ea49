//! The HLS segmenter. Grounded on `protocol/hls/source.go`'s `Source`:
//! a subscriber that demuxes each FLV packet a second time (stripping
//! container bytes), feeds it through the shared `CodecParser` contract,
//! tracks per-segment PTS/DTS, and cuts a new MPEG-TS segment on every
//! video key-frame once the tracked duration reaches the target (spec
//! §4.6).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Bytes, BytesMut};
use parking_lot::Mutex;

use crate::aac::AdtsParser;
use crate::channel::errors::{ChannelError, ChannelErrorValue};
use crate::channel::packet::{codec_id, sound_format, Packet, PacketHeader};
use crate::channel::queue::PacketQueue;
use crate::channel::subscriber::Subscriber;
use crate::codec::CodecParser;
use crate::flv::errors::DemuxerErrorValue;
use crate::flv::FlvDemuxer;
use crate::h264::AvcParser;
use crate::mpegts::TsMuxer;
use crate::timestamp::Timestamp;

use super::errors::{HlsError, HlsErrorValue};
use super::segment_cache::{Segment, SegmentCache};

pub const DEFAULT_QUEUE_CAPACITY: usize = 512;
pub const DEFAULT_SEGMENT_DURATION_MS: u32 = 3000;
pub const DEFAULT_SEGMENT_CACHE_CAPACITY: usize = 5;

/// Number of AAC frames batched into one TS audio access unit before a
/// mandatory flush (spec §4.6 "a small batching threshold"); flushed early,
/// one frame at a time, on segment cut.
const CACHE_MAX_FRAMES: usize = 5;
const VIDEO_HZ: u64 = 90;

/// Forward-only PTS aligner for AAC frames: the first call anchors the
/// base at the observed timestamp, every call after advances by a fixed
/// sample-duration increment so frames pack back-to-back without gaps.
#[derive(Debug, Default)]
struct AudioAlign {
    frame_base: u64,
}

impl AudioAlign {
    fn align(&mut self, dts: &mut u64, inc: u32) {
        if self.frame_base == 0 {
            self.frame_base = *dts;
        } else {
            self.frame_base += u64::from(inc);
        }
        *dts = self.frame_base;
    }
}

#[derive(Debug, Default)]
struct AudioCache {
    frames: Vec<(u64, BytesMut)>,
}

impl AudioCache {
    fn push(&mut self, pts: u64, data: &[u8]) {
        self.frames.push((pts, BytesMut::from(data)));
    }

    fn len(&self) -> usize {
        self.frames.len()
    }

    /// Concatenates every cached frame into one access unit, tagged with
    /// the first frame's PTS, and clears the cache.
    fn take(&mut self) -> Option<(u64, BytesMut)> {
        if self.frames.is_empty() {
            return None;
        }
        let pts = self.frames[0].0;
        let mut combined = BytesMut::new();
        for (_, data) in self.frames.drain(..) {
            combined.extend_from_slice(&data);
        }
        Some((pts, combined))
    }
}

#[derive(Debug, Default)]
struct SegmentStat {
    video_first: Option<u32>,
    video_last: u32,
    audio_first: Option<u32>,
    audio_last: u32,
}

impl SegmentStat {
    fn update(&mut self, is_video: bool, ts: u32) {
        if is_video {
            self.video_first.get_or_insert(ts);
            self.video_last = ts;
        } else {
            self.audio_first.get_or_insert(ts);
            self.audio_last = ts;
        }
    }

    fn duration_ms(&self) -> u32 {
        let video = self.video_first.map_or(0, |first| self.video_last.saturating_sub(first));
        let audio = self.audio_first.map_or(0, |first| self.audio_last.saturating_sub(first));
        video.max(audio)
    }

    fn reset(&mut self) {
        *self = Self::default();
    }
}

struct SegmenterState {
    demuxer: FlvDemuxer,
    video_parser: AvcParser,
    audio_parser: AdtsParser,
    ts_muxer: TsMuxer,
    audio_cache: AudioCache,
    align: AudioAlign,
    stat: SegmentStat,
    ts_buffer: BytesMut,
    segment_open: bool,
    sequence: i64,
    pts: u64,
    dts: u64,
    segment_duration_ms: u32,
}

impl SegmenterState {
    fn new(segment_duration_ms: u32) -> Self {
        Self {
            demuxer: FlvDemuxer::new(),
            video_parser: AvcParser::new(),
            audio_parser: AdtsParser::new(),
            ts_muxer: TsMuxer::new(),
            audio_cache: AudioCache::default(),
            align: AudioAlign::default(),
            stat: SegmentStat::default(),
            ts_buffer: BytesMut::new(),
            segment_open: false,
            sequence: 0,
            pts: 0,
            dts: 0,
            segment_duration_ms,
        }
    }

    fn process(&mut self, packet: Packet, segment_cache: &SegmentCache) -> Result<(), HlsError> {
        let is_video = packet.is_video();

        let demuxed = if is_video {
            match self.demuxer.demux_video(packet.timestamp, packet.data, true) {
                Ok(demuxed) => demuxed,
                Err(error) if matches!(error.value, DemuxerErrorValue::AvcEndSeq) => return Ok(()),
                Err(error) => return Err(error.into()),
            }
        } else {
            self.demuxer.demux_audio(packet.timestamp, packet.data, true)?
        };

        let (is_seq, is_key_frame, composition_time) = match &demuxed.header {
            PacketHeader::Video(header) => {
                if header.codec_id != codec_id::AVC {
                    return Err(HlsErrorValue::NoSupportVideoCodec.into());
                }
                (header.is_seq(), header.is_key_frame(), header.composition_time)
            }
            PacketHeader::Audio(header) => {
                if header.sound_format != sound_format::AAC {
                    return Err(HlsErrorValue::NoSupportAudioCodec.into());
                }
                (header.is_aac_sequence_header(), false, 0)
            }
            PacketHeader::None => (false, false, 0),
        };

        if is_seq {
            if is_video {
                self.video_parser
                    .parse_sequence_header(&demuxed.data)
                    .map_err(|e| HlsErrorValue::CodecError(e.to_string()))?;
            } else {
                self.audio_parser
                    .parse_sequence_header(&demuxed.data)
                    .map_err(|e| HlsErrorValue::CodecError(e.to_string()))?;
            }
            return Ok(());
        }

        let mut out = BytesMut::new();
        if is_video {
            self.video_parser
                .parse(&demuxed.data, &mut out)
                .map_err(|e| HlsErrorValue::CodecError(e.to_string()))?;
        } else {
            self.audio_parser
                .parse(&demuxed.data, &mut out)
                .map_err(|e| HlsErrorValue::CodecError(e.to_string()))?;
        }

        if is_video && is_key_frame {
            self.cut(segment_cache)?;
        }

        if self.segment_open {
            self.stat.update(is_video, demuxed.timestamp);
            self.calc_pts_dts(is_video, demuxed.timestamp, composition_time);
            self.ts_mux(is_video, is_key_frame, &out)?;
        }

        Ok(())
    }

    fn calc_pts_dts(&mut self, is_video: bool, ts: u32, composition_time: i32) {
        let dts = u64::from(ts) * VIDEO_HZ;
        if is_video {
            self.dts = dts;
            self.pts = (dts as i64 + i64::from(composition_time) * 90) as u64;
        } else {
            let sample_rate = self.audio_parser.sample_rate();
            let inc = if sample_rate == 0 {
                0
            } else {
                (90_000u64 * 1024 / u64::from(sample_rate)) as u32
            };
            let mut aligned = dts;
            self.align.align(&mut aligned, inc);
            self.dts = aligned;
            self.pts = aligned;
        }
    }

    fn ts_mux(&mut self, is_video: bool, is_key_frame: bool, data: &[u8]) -> Result<(), HlsError> {
        if is_video {
            self.ts_muxer
                .write_frame(true, self.pts, self.dts, is_key_frame, data, &mut self.ts_buffer)?;
        } else {
            self.audio_cache.push(self.pts, data);
            self.mux_audio(CACHE_MAX_FRAMES)?;
        }
        Ok(())
    }

    fn mux_audio(&mut self, limit: usize) -> Result<(), HlsError> {
        if self.audio_cache.len() < limit {
            return Ok(());
        }
        if let Some((pts, buf)) = self.audio_cache.take() {
            self.ts_muxer
                .write_frame(false, pts, pts, false, &buf, &mut self.ts_buffer)?;
        }
        Ok(())
    }

    fn flush_audio(&mut self) -> Result<(), HlsError> {
        self.mux_audio(1)
    }

    /// Called only on a video key-frame (spec §4.6). Opens the first
    /// segment, or cuts the current one once its tracked duration has
    /// reached the target; emits PAT/PMT only at the start of a segment.
    fn cut(&mut self, segment_cache: &SegmentCache) -> Result<(), HlsError> {
        let mut starting_segment = true;
        if !self.segment_open {
            self.ts_buffer.clear();
            self.segment_open = true;
        } else if self.stat.duration_ms() >= self.segment_duration_ms {
            self.flush_audio()?;
            self.sequence += 1;
            let segment = Segment::new(
                segment_name(),
                self.sequence,
                i64::from(self.stat.duration_ms()),
                Bytes::copy_from_slice(&self.ts_buffer),
            );
            segment_cache.push(segment);
            self.ts_buffer.clear();
            self.stat.reset();
        } else {
            starting_segment = false;
        }

        if starting_segment {
            self.ts_muxer.write_pat_pmt(&mut self.ts_buffer)?;
        }
        Ok(())
    }
}

fn segment_name() -> String {
    let micros = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_micros();
    micros.to_string()
}

/// A Source is itself a `Subscriber`: the Channel's fan-out calls `write`,
/// which reconciles the packet's timestamp and enqueues it; a separate
/// segmenter task drains the queue and drives `SegmenterState`.
pub struct Source {
    queue: Arc<PacketQueue>,
    closed: AtomicBool,
    reconciler: Mutex<Timestamp>,
    segment_cache: Arc<SegmentCache>,
    state: Mutex<SegmenterState>,
}

impl Source {
    #[must_use]
    pub fn new() -> Arc<Self> {
        Self::with_config(
            DEFAULT_QUEUE_CAPACITY,
            DEFAULT_SEGMENT_DURATION_MS,
            DEFAULT_SEGMENT_CACHE_CAPACITY,
        )
    }

    #[must_use]
    pub fn with_config(queue_capacity: usize, segment_duration_ms: u32, segment_cache_capacity: usize) -> Arc<Self> {
        Arc::new(Self {
            queue: Arc::new(PacketQueue::new(queue_capacity)),
            closed: AtomicBool::new(false),
            reconciler: Mutex::new(Timestamp::new()),
            segment_cache: Arc::new(SegmentCache::with_capacity(segment_cache_capacity)),
            state: Mutex::new(SegmenterState::new(segment_duration_ms)),
        })
    }

    #[must_use]
    pub fn segment_cache(&self) -> Arc<SegmentCache> {
        self.segment_cache.clone()
    }

    /// The segmenter task: drains the inbound queue until it is closed,
    /// demuxing/parsing/cutting each packet in turn.
    pub async fn run(self: Arc<Self>) {
        while let Some(packet) = self.queue.pop().await {
            if let Err(error) = self.state.lock().process(packet, &self.segment_cache) {
                tracing::warn!(%error, "hls source: dropping packet");
            }
        }
    }
}

impl Subscriber for Source {
    fn write(&self, packet: &Packet) -> Result<(), ChannelError> {
        if self.closed.load(Ordering::Acquire) || self.queue.is_closed() {
            return Err(ChannelErrorValue::Closed.into());
        }
        let mut packet = packet.deep_clone();
        packet.timestamp = self.reconciler.lock().reconcile(packet.timestamp, false);
        self.queue.push(packet);
        Ok(())
    }

    fn close(&self) {
        self.closed.store(true, Ordering::Release);
        self.queue.close();
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::packet::{avc_packet_type, frame_type, PacketKind};

    fn sps_pps_dcr() -> Vec<u8> {
        let sps = [0x67, 0x42, 0x00, 0x1e];
        let pps = [0x68, 0xce, 0x3c, 0x80];
        let mut dcr = vec![1, 0x42, 0x00, 0x1e, 0xff, 0xe1];
        dcr.extend_from_slice(&(sps.len() as u16).to_be_bytes());
        dcr.extend_from_slice(&sps);
        dcr.push(1);
        dcr.extend_from_slice(&(pps.len() as u16).to_be_bytes());
        dcr.extend_from_slice(&pps);
        dcr
    }

    fn video_tag(frame_type: u8, avc_packet_type: u8, composition_time: i32, nalu_payload: &[u8]) -> Bytes {
        let mut body = vec![(frame_type << 4) | codec_id::AVC, avc_packet_type];
        let ct = composition_time.to_be_bytes();
        body.extend_from_slice(&ct[1..]);
        body.extend_from_slice(nalu_payload);
        Bytes::from(body)
    }

    #[test]
    fn video_sequence_header_feeds_parser_and_does_not_emit_ts() {
        let mut state = SegmenterState::new(DEFAULT_SEGMENT_DURATION_MS);
        let cache = SegmentCache::new();
        let packet = Packet {
            kind: PacketKind::Video,
            timestamp: 0,
            stream_id: 0,
            header: PacketHeader::None,
            data: video_tag(frame_type::KEY, avc_packet_type::SEQ_HEADER, 0, &sps_pps_dcr()),
        };
        state.process(packet, &cache).unwrap();
        assert!(!state.video_parser.sps().is_empty());
        assert!(state.ts_buffer.is_empty());
    }

    #[test]
    fn first_keyframe_opens_segment_and_writes_pat_pmt() {
        let mut state = SegmenterState::new(DEFAULT_SEGMENT_DURATION_MS);
        let cache = SegmentCache::new();

        let seq = Packet {
            kind: PacketKind::Video,
            timestamp: 0,
            stream_id: 0,
            header: PacketHeader::None,
            data: video_tag(frame_type::KEY, avc_packet_type::SEQ_HEADER, 0, &sps_pps_dcr()),
        };
        state.process(seq, &cache).unwrap();

        let mut nalu = (4u32).to_be_bytes().to_vec();
        nalu.extend_from_slice(&[0x65, 0xaa, 0xbb, 0xcc]);
        let frame = Packet {
            kind: PacketKind::Video,
            timestamp: 40,
            stream_id: 0,
            header: PacketHeader::None,
            data: video_tag(frame_type::KEY, avc_packet_type::NALU, 0, &nalu),
        };
        state.process(frame, &cache).unwrap();

        assert!(state.segment_open);
        assert!(!state.ts_buffer.is_empty());
        assert_eq!(state.ts_buffer[0], 0x47);
    }

    #[test]
    fn reaching_target_duration_cuts_a_segment_into_the_cache() {
        let mut state = SegmenterState::new(1000);
        let cache = SegmentCache::new();

        let seq = Packet {
            kind: PacketKind::Video,
            timestamp: 0,
            stream_id: 0,
            header: PacketHeader::None,
            data: video_tag(frame_type::KEY, avc_packet_type::SEQ_HEADER, 0, &sps_pps_dcr()),
        };
        state.process(seq, &cache).unwrap();

        let mut nalu = (4u32).to_be_bytes().to_vec();
        nalu.extend_from_slice(&[0x65, 0xaa, 0xbb, 0xcc]);

        for ts in [0u32, 1500] {
            let frame = Packet {
                kind: PacketKind::Video,
                timestamp: ts,
                stream_id: 0,
                header: PacketHeader::None,
                data: video_tag(frame_type::KEY, avc_packet_type::NALU, 0, &nalu),
            };
            state.process(frame, &cache).unwrap();
        }

        assert_eq!(cache.all().len(), 1);
        assert_eq!(state.sequence, 1);
    }

    #[test]
    fn non_avc_video_codec_is_rejected() {
        let mut state = SegmenterState::new(DEFAULT_SEGMENT_DURATION_MS);
        let cache = SegmentCache::new();
        let packet = Packet {
            kind: PacketKind::Video,
            timestamp: 0,
            stream_id: 0,
            header: PacketHeader::None,
            data: Bytes::from_static(&[0x12, 0x00]),
        };
        let err = state.process(packet, &cache).unwrap_err();
        assert!(matches!(err.value, HlsErrorValue::NoSupportVideoCodec));
    }
}
