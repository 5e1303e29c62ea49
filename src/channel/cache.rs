//! The GOP + sequence-header cache a Channel keeps fresh for each
//! publication. Grounded on `cache/{cache,gop,special}.go`: a single-slot
//! cache per special packet class (metadata, video sequence header, audio
//! sequence header) plus a bounded GOP buffer that resets on every key
//! frame and silently refuses further writes once it hits the ceiling,
//! resuming at the next key frame.

use parking_lot::Mutex;

use super::errors::ChannelError;
use super::packet::{Packet, PacketKind};
use super::subscriber::Subscriber;

/// Default GOP ceiling (spec §3/§6: 1024 packets).
pub const DEFAULT_GOP_MAX_PACKETS: usize = 1024;

struct GopBuffer {
    packets: Vec<Packet>,
    complete: bool,
    max_packets: usize,
}

impl GopBuffer {
    fn new(max_packets: usize) -> Self {
        Self {
            packets: Vec::with_capacity(max_packets.min(256)),
            complete: false,
            max_packets,
        }
    }

    fn reset(&mut self) {
        self.packets.clear();
        self.complete = false;
    }

    /// Writes a non-seq video packet into the GOP buffer. Silently refuses
    /// the write past the ceiling (the upstream source discards the error
    /// from this path entirely) until the next key frame resets the buffer.
    fn write(&mut self, packet: Packet) {
        let is_key_frame = packet
            .header
            .as_video()
            .is_some_and(super::packet::VideoHeader::is_key_frame);

        if !self.complete && !is_key_frame {
            return;
        }
        if is_key_frame {
            self.reset();
            self.complete = true;
        }
        if self.packets.len() >= self.max_packets {
            return;
        }
        self.packets.push(packet);
    }

    fn send(&self, sub: &dyn Subscriber) -> Result<(), ChannelError> {
        if !self.complete {
            return Ok(());
        }
        for p in &self.packets {
            sub.write(p)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct SpecialSlot {
    packet: Option<Packet>,
}

impl SpecialSlot {
    fn write(&mut self, packet: Packet) {
        self.packet = Some(packet);
    }

    fn send(&self, sub: &dyn Subscriber) -> Result<(), ChannelError> {
        match &self.packet {
            Some(p) => sub.write(p),
            None => Ok(()),
        }
    }
}

/// The per-publication cache: metadata / video-seq / audio-seq single
/// slots plus the rolling GOP buffer. One instance is created fresh on
/// every publish start (spec §4.5).
pub struct Cache {
    gop: Mutex<GopBuffer>,
    video_seq: Mutex<SpecialSlot>,
    audio_seq: Mutex<SpecialSlot>,
    metadata: Mutex<SpecialSlot>,
}

impl Cache {
    #[must_use]
    pub fn new(gop_max_packets: usize) -> Self {
        Self {
            gop: Mutex::new(GopBuffer::new(gop_max_packets)),
            video_seq: Mutex::new(SpecialSlot::default()),
            audio_seq: Mutex::new(SpecialSlot::default()),
            metadata: Mutex::new(SpecialSlot::default()),
        }
    }

    /// Routes an incoming publisher packet into the correct cache slot per
    /// spec §4.5 step 1. Packets that don't match a caching rule (ordinary
    /// audio frames) are intentionally not retained.
    pub fn write(&self, packet: &Packet) {
        match packet.kind {
            PacketKind::Metadata => self.metadata.lock().write(packet.shallow_clone()),
            PacketKind::Audio => {
                if packet
                    .header
                    .as_audio()
                    .is_some_and(super::packet::AudioHeader::is_aac_sequence_header)
                {
                    self.audio_seq.lock().write(packet.shallow_clone());
                }
            }
            PacketKind::Video => {
                if packet.header.as_video().is_some_and(super::packet::VideoHeader::is_seq) {
                    self.video_seq.lock().write(packet.shallow_clone());
                } else {
                    self.gop.lock().write(packet.shallow_clone());
                }
            }
        }
    }

    /// Replays the cache to a newly-joined subscriber in the order
    /// `{metadata, video-seq, audio-seq, GOP}` (spec §4.5 step 2).
    pub fn send(&self, sub: &dyn Subscriber) -> Result<(), ChannelError> {
        self.metadata.lock().send(sub)?;
        self.video_seq.lock().send(sub)?;
        self.audio_seq.lock().send(sub)?;
        self.gop.lock().send(sub)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::packet::{AudioHeader, PacketHeader, VideoHeader};
    use bytes::Bytes;

    fn video(ts: u32, key: bool) -> Packet {
        Packet {
            kind: PacketKind::Video,
            timestamp: ts,
            stream_id: 1,
            header: PacketHeader::Video(VideoHeader {
                frame_type: if key { 1 } else { 2 },
                codec_id: 7,
                avc_packet_type: 1,
                composition_time: 0,
            }),
            data: Bytes::from_static(b"v"),
        }
    }

    struct Recorder(Mutex<Vec<u32>>);
    impl Subscriber for Recorder {
        fn write(&self, p: &Packet) -> Result<(), ChannelError> {
            self.0.lock().push(p.timestamp);
            Ok(())
        }
        fn close(&self) {}
        fn is_closed(&self) -> bool {
            false
        }
    }

    #[test]
    fn gop_resets_on_keyframe_and_replays_from_latest() {
        let cache = Cache::new(DEFAULT_GOP_MAX_PACKETS);
        cache.write(&video(0, true));
        cache.write(&video(1, false));
        cache.write(&video(30, true));
        cache.write(&video(31, false));

        let rec = Recorder(Mutex::new(Vec::new()));
        cache.send(&rec).unwrap();
        assert_eq!(rec.0.lock().clone(), vec![30, 31]);
    }

    #[test]
    fn gop_refuses_past_ceiling_until_next_keyframe() {
        let cache = Cache::new(2);
        cache.write(&video(0, true));
        cache.write(&video(1, false));
        cache.write(&video(2, false)); // refused, ceiling=2 already hit

        let rec = Recorder(Mutex::new(Vec::new()));
        cache.send(&rec).unwrap();
        assert_eq!(rec.0.lock().clone(), vec![0, 1]);
    }

    #[test]
    fn audio_seq_header_is_cached_but_raw_audio_is_not() {
        let cache = Cache::new(DEFAULT_GOP_MAX_PACKETS);
        let seq = Packet {
            kind: PacketKind::Audio,
            timestamp: 0,
            stream_id: 1,
            header: PacketHeader::Audio(AudioHeader {
                sound_format: 10,
                aac_packet_type: 0,
            }),
            data: Bytes::from_static(b"asc"),
        };
        cache.write(&seq);
        let raw = Packet {
            kind: PacketKind::Audio,
            timestamp: 10,
            stream_id: 1,
            header: PacketHeader::Audio(AudioHeader {
                sound_format: 10,
                aac_packet_type: 1,
            }),
            data: Bytes::from_static(b"raw"),
        };
        cache.write(&raw);

        let rec = Recorder(Mutex::new(Vec::new()));
        cache.send(&rec).unwrap();
        assert_eq!(rec.0.lock().clone(), vec![0]);
    }
}
