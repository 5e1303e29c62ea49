//! MPEG-TS packetizer: wraps PAT/PMT sections and PES-framed elementary
//! streams into 188-byte TS packets. Grounded on `pat.rs`/`pmt.rs`'s section
//! muxers plus the PTS/DTS derivation and PAT/PMT-at-segment-start policy
//! from `protocol/hls/source.go` (spec §4.6: "emit PAT and PMT ... at the
//! start of the new segment").

use byteorder::BigEndian;
use bytes::{BufMut, BytesMut};

use crate::bytesio::bytes_writer::BytesWriter;

use super::define::{
    epat_pid, epsi_stream_type, AUDIO_PID, PES_STREAM_ID_AUDIO, PES_STREAM_ID_VIDEO, TS_PACKET_SIZE,
    TS_SYNC_BYTE, VIDEO_PID,
};
use super::errors::MpegTsError;
use super::pat::{Pat, PatMuxer};
use super::pes::Pes;
use super::pmt::{Pmt, PmtMuxer};

const TS_PAYLOAD_SIZE: usize = TS_PACKET_SIZE - 4;

pub struct TsMuxer {
    pat: Pat,
    pmt: Pmt,
    pat_muxer: PatMuxer,
    pmt_muxer: PmtMuxer,
    pat_pes: Pes,
    pmt_pes: Pes,
    video: Pes,
    audio: Pes,
}

impl TsMuxer {
    #[must_use]
    pub fn new() -> Self {
        let mut pmt = Pmt::new();
        pmt.pid = epat_pid::PMT_PID;
        pmt.program_number = 1;
        pmt.pcr_pid = VIDEO_PID;
        pmt.streams = vec![
            Pes::new(VIDEO_PID, epsi_stream_type::PSI_STREAM_H264),
            Pes::new(AUDIO_PID, epsi_stream_type::PSI_STREAM_AAC),
        ];

        let mut pat = Pat::new();
        pat.pmt.push(pmt.clone());

        Self {
            pat,
            pmt,
            pat_muxer: PatMuxer::new(),
            pmt_muxer: PmtMuxer::new(),
            pat_pes: Pes::new(epat_pid::PAT_PID, 0),
            pmt_pes: Pes::new(epat_pid::PMT_PID, 0),
            video: Pes::new(VIDEO_PID, epsi_stream_type::PSI_STREAM_H264),
            audio: Pes::new(AUDIO_PID, epsi_stream_type::PSI_STREAM_AAC),
        }
    }

    /// Emits the PAT and PMT TS packets (2 packets, 376 bytes), called at
    /// the start of every segment.
    pub fn write_pat_pmt(&mut self, out: &mut BytesMut) -> Result<(), MpegTsError> {
        let pat_section = self.pat_muxer.write(self.pat.clone())?;
        write_section_packet(epat_pid::PAT_PID, &pat_section, &mut self.pat_pes, out);

        let pmt_section = self.pmt_muxer.write(&self.pmt)?;
        write_section_packet(epat_pid::PMT_PID, &pmt_section, &mut self.pmt_pes, out);
        Ok(())
    }

    /// Wraps one elementary-stream access unit in a PES header and
    /// packetizes it into TS packets, attaching a PCR on the first packet
    /// of video key frames.
    pub fn write_frame(
        &mut self,
        is_video: bool,
        pts: u64,
        dts: u64,
        is_key_frame: bool,
        data: &[u8],
        out: &mut BytesMut,
    ) -> Result<(), MpegTsError> {
        let pes_payload = build_pes_packet(is_video, pts, dts, data);
        let pcr = if is_video && is_key_frame { Some(dts) } else { None };
        let (pid, pes) = if is_video {
            (VIDEO_PID, &mut self.video)
        } else {
            (AUDIO_PID, &mut self.audio)
        };
        write_pes_packets(pid, &pes_payload, pes, pcr, out);
        Ok(())
    }
}

impl Default for TsMuxer {
    fn default() -> Self {
        Self::new()
    }
}

fn pes_stream_id(is_video: bool) -> u8 {
    if is_video {
        PES_STREAM_ID_VIDEO
    } else {
        PES_STREAM_ID_AUDIO
    }
}

fn write_pts_dts(buf: &mut BytesMut, prefix: u8, ts: u64) {
    let ts = ts & 0x1_ffff_ffff;
    let b0 = (prefix << 4) | ((((ts >> 30) & 0x07) as u8) << 1) | 1;
    let b1 = ((ts >> 22) & 0xff) as u8;
    let b2 = ((((ts >> 15) & 0x7f) as u8) << 1) | 1;
    let b3 = ((ts >> 7) & 0xff) as u8;
    let b4 = ((((ts) & 0x7f) as u8) << 1) | 1;
    buf.put_slice(&[b0, b1, b2, b3, b4]);
}

fn build_pes_packet(is_video: bool, pts: u64, dts: u64, data: &[u8]) -> BytesMut {
    let mut pes = BytesMut::with_capacity(data.len() + 19);
    pes.put_slice(&[0x00, 0x00, 0x01]);
    pes.put_u8(pes_stream_id(is_video));

    let has_dts = dts != pts;
    let header_data_len: u8 = if has_dts { 10 } else { 5 };
    let total_len = 3 + usize::from(header_data_len) + data.len();
    let pes_packet_length: u16 = if is_video || total_len > 0xffff {
        0
    } else {
        total_len as u16
    };
    pes.put_u16(pes_packet_length);

    pes.put_u8(0x80);
    let pts_dts_flags = if has_dts { 0xc0 } else { 0x80 };
    pes.put_u8(pts_dts_flags);
    pes.put_u8(header_data_len);

    if has_dts {
        write_pts_dts(&mut pes, 0x03, pts);
        write_pts_dts(&mut pes, 0x01, dts);
    } else {
        write_pts_dts(&mut pes, 0x02, pts);
    }

    pes.put_slice(data);
    pes
}

fn write_section_packet(pid: u16, section: &BytesMut, pes: &mut Pes, out: &mut BytesMut) {
    // PSI sections carry a pointer_field byte (0) before the table data
    // when payload_unit_start_indicator is set.
    let mut payload = BytesMut::with_capacity(section.len() + 1);
    payload.put_u8(0);
    payload.extend_from_slice(section);
    write_pes_packets(pid, &payload, pes, None, out);
}

/// Packetizes `payload` (a full PES packet or a PSI section with its
/// pointer-field byte) into 188-byte TS packets. `pcr` is stamped into the
/// adaptation field of the first packet only.
fn write_pes_packets(pid: u16, payload: &BytesMut, pes: &mut Pes, pcr: Option<u64>, out: &mut BytesMut) {
    let mut pos = 0;
    let mut first = true;
    let mut pcr = pcr;

    while pos < payload.len() {
        let remaining = payload.len() - pos;
        let pcr_for_packet = if first { pcr.take() } else { None };
        let needs_pcr = pcr_for_packet.is_some();

        // `core_len` counts the mandatory adaptation-field flags byte (1)
        // plus the PCR (6) when present; it excludes stuffing. Any
        // adaptation field, once present, always carries its flags byte.
        let (take, adaptation_field_len) = if !needs_pcr && remaining >= TS_PAYLOAD_SIZE {
            (TS_PAYLOAD_SIZE, None)
        } else {
            let core_len = if needs_pcr { 7 } else { 1 };
            let available_after_core = TS_PAYLOAD_SIZE - 1 - core_len;
            let take = remaining.min(available_after_core);
            (take, Some((TS_PAYLOAD_SIZE - 1 - take, core_len)))
        };

        let mut writer = BytesWriter::with_capacity(TS_PACKET_SIZE);
        let _ = writer.write_u8(TS_SYNC_BYTE);
        let pusi = u8::from(first) << 6;
        let _ = writer.write_u8(pusi | (((pid >> 8) as u8) & 0x1f));
        let _ = writer.write_u8((pid & 0xff) as u8);

        let cc = pes.next_continuity_counter();
        let adaptation_field_control: u8 = if adaptation_field_len.is_some() { 0b11 } else { 0b01 };
        let _ = writer.write_u8((adaptation_field_control << 4) | cc);

        if let Some((afl, core_len)) = adaptation_field_len {
            let _ = writer.write_u8(afl as u8);
            if afl > 0 {
                let stuffing = afl - core_len;
                if let Some(pcr_value) = pcr_for_packet {
                    let mut pcr_bytes = BytesMut::new();
                    build_pcr_adaptation_field(&mut pcr_bytes, pcr_value);
                    let _ = writer.write(&pcr_bytes);
                } else {
                    // flags byte only: no discontinuity/random-access/ES-priority/extension.
                    let _ = writer.write_u8(0x00);
                }
                for _ in 0..stuffing {
                    let _ = writer.write_u8(0xff);
                }
            }
        }

        let _ = writer.write(&payload[pos..pos + take]);
        pos += take;

        let packet = writer.extract_current_bytes();
        debug_assert_eq!(packet.len(), TS_PACKET_SIZE);
        out.extend_from_slice(&packet);

        first = false;
    }
}

fn build_pcr_adaptation_field(adaptation: &mut BytesMut, pcr_90khz: u64) {
    // discontinuity=0, random_access=1, es_priority=0, the four flag bits=0, PCR flag set.
    adaptation.put_u8(0x50);
    let pcr_base = pcr_90khz & 0x1_ffff_ffff;
    let pcr_ext: u16 = 0;
    let b0 = ((pcr_base >> 25) & 0xff) as u8;
    let b1 = ((pcr_base >> 17) & 0xff) as u8;
    let b2 = ((pcr_base >> 9) & 0xff) as u8;
    let b3 = ((pcr_base >> 1) & 0xff) as u8;
    let b4 = (((pcr_base & 0x01) as u8) << 7) | 0x7e | (((pcr_ext >> 8) & 0x01) as u8);
    let b5 = (pcr_ext & 0xff) as u8;
    adaptation.put_slice(&[b0, b1, b2, b3, b4, b5]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pat_pmt_packets_are_188_bytes_and_sync_aligned() {
        let mut muxer = TsMuxer::new();
        let mut out = BytesMut::new();
        muxer.write_pat_pmt(&mut out).unwrap();

        assert_eq!(out.len() % TS_PACKET_SIZE, 0);
        for chunk in out.chunks(TS_PACKET_SIZE) {
            assert_eq!(chunk[0], TS_SYNC_BYTE);
        }
    }

    #[test]
    fn video_keyframe_packet_carries_pcr_adaptation_field() {
        let mut muxer = TsMuxer::new();
        let mut out = BytesMut::new();
        muxer.write_frame(true, 900, 900, true, &[0u8; 10], &mut out).unwrap();

        assert_eq!(out.len() % TS_PACKET_SIZE, 0);
        assert_eq!(out[0], TS_SYNC_BYTE);
        let adaptation_control = (out[3] >> 4) & 0x03;
        assert_eq!(adaptation_control, 0b11);
    }

    #[test]
    fn large_frame_spans_multiple_ts_packets() {
        let mut muxer = TsMuxer::new();
        let mut out = BytesMut::new();
        let data = vec![0xab; 1000];
        muxer.write_frame(true, 0, 0, false, &data, &mut out).unwrap();

        assert!(out.len() >= TS_PACKET_SIZE * 2);
        assert_eq!(out.len() % TS_PACKET_SIZE, 0);
        for chunk in out.chunks(TS_PACKET_SIZE) {
            assert_eq!(chunk[0], TS_SYNC_BYTE);
        }
    }
}
