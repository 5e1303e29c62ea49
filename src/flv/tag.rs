//! FLV media tag header parsing. Grounded on `container/flv/tag.go`'s
//! `parseAudioHeader`/`parseVideoHeader`: the first 1-2 bytes of an
//! audio/video tag body carry a fixed bitfield describing the codec, with
//! AVC video additionally carrying a 3-byte composition-time offset.

use crate::bytesio::bytes_reader::BytesReader;
use crate::channel::packet::{AudioHeader, VideoHeader};

use super::errors::{DemuxerErrorValue, FlvDemuxerError};

/// Reads `soundFormat(4) | soundRate(2) | soundSize(1) | soundType(1)`,
/// then `aacPacketType` when the format is AAC.
pub fn parse_audio_header(reader: &mut BytesReader) -> Result<AudioHeader, FlvDemuxerError> {
    let byte0 = reader.read_u8()?;
    let sound_format = byte0 >> 4;
    let aac_packet_type = if sound_format == crate::channel::packet::sound_format::AAC {
        reader.read_u8()?
    } else {
        0
    };
    Ok(AudioHeader {
        sound_format,
        aac_packet_type,
    })
}

/// Reads `frameType(4) | codecId(4)`, then `avcPacketType` and the signed
/// 24-bit composition-time offset when the codec is AVC. The source
/// accumulates the three composition-time bytes via left-shift on a
/// signed accumulator — preserved here bit-for-bit (spec §9).
pub fn parse_video_header(reader: &mut BytesReader) -> Result<VideoHeader, FlvDemuxerError> {
    let byte0 = reader.read_u8()?;
    let frame_type = byte0 >> 4;
    let codec_id = byte0 & 0x0f;

    let (avc_packet_type, composition_time) = if codec_id == crate::channel::packet::codec_id::AVC {
        let avc_packet_type = reader.read_u8()?;
        let mut composition_time: i32 = 0;
        for _ in 0..3 {
            composition_time = (composition_time << 8) + i32::from(reader.read_u8()?);
        }
        // Sign-extend from 24 bits.
        if composition_time & 0x0080_0000 != 0 {
            composition_time -= 0x0100_0000;
        }
        (avc_packet_type, composition_time)
    } else {
        (0, 0)
    };

    Ok(VideoHeader {
        frame_type,
        codec_id,
        avc_packet_type,
        composition_time,
    })
}

pub fn avc_end_of_sequence(byte0: u8, byte1: u8) -> bool {
    byte0 == 0x17 && byte1 == 0x02
}

pub fn require_non_empty(data: &[u8]) -> Result<(), FlvDemuxerError> {
    if data.is_empty() {
        return Err(DemuxerErrorValue::TagDataLength.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::BytesMut;

    #[test]
    fn parses_aac_audio_header() {
        let mut r = BytesReader::new(BytesMut::from(&[0xaf, 0x01][..]));
        let h = parse_audio_header(&mut r).unwrap();
        assert_eq!(h.sound_format, 10);
        assert_eq!(h.aac_packet_type, 1);
    }

    #[test]
    fn parses_avc_video_header_with_negative_composition_time() {
        let mut r = BytesReader::new(BytesMut::from(&[0x27, 0x01, 0xff, 0xff, 0xfe][..]));
        let h = parse_video_header(&mut r).unwrap();
        assert_eq!(h.frame_type, 2);
        assert_eq!(h.codec_id, 7);
        assert_eq!(h.avc_packet_type, 1);
        assert_eq!(h.composition_time, -2);
    }

    #[test]
    fn detects_avc_end_of_sequence_marker() {
        assert!(avc_end_of_sequence(0x17, 0x02));
        assert!(!avc_end_of_sequence(0x17, 0x01));
    }
}
