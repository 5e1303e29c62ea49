//! AAC AudioSpecificConfig parsing and ADTS reframing. Grounded on the same
//! sequence-descriptor contract as `h264::AvcParser` (spec §4.6 step 1:
//! "AAC seq header → feed to AAC parser as ASC ... and skip further
//! handling").

use bytes::BytesMut;

use super::errors::{AacError, AacErrorValue};
use crate::bytesio::bits_errors::{BitError, BitErrorValue};
use crate::codec::CodecParser;

/// Index into `SAMPLING_FREQUENCIES` as carried in the ASC's 4-bit field.
const SAMPLING_FREQUENCIES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

const ADTS_HEADER_LEN: usize = 7;

#[derive(Debug, Default, Clone)]
pub struct AdtsParser {
    profile: u8,
    sampling_frequency_index: u8,
    channel_config: u8,
    sample_rate: u32,
}

impl AdtsParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn write_adts_header(&self, frame_len: usize, out: &mut BytesMut) {
        let adts_len = (frame_len + ADTS_HEADER_LEN) as u16;
        // ADTS fixed+variable header, no CRC (protection_absent=1).
        out.extend_from_slice(&[0xff, 0xf1]);
        let mut b3 = (self.profile << 6) & 0xc0;
        b3 |= (self.sampling_frequency_index << 2) & 0x3c;
        b3 |= (self.channel_config >> 2) & 0x01;
        out.extend_from_slice(&[b3]);
        let b4 = ((self.channel_config & 0x03) << 6) | ((adts_len >> 11) as u8 & 0x03);
        out.extend_from_slice(&[b4]);
        let b5 = ((adts_len >> 3) & 0xff) as u8;
        out.extend_from_slice(&[b5]);
        let b6 = (((adts_len & 0x07) << 5) as u8) | 0x1f;
        out.extend_from_slice(&[b6, 0xfc]);
    }
}

impl CodecParser for AdtsParser {
    type Error = AacError;

    /// Parses the first two bytes of an AudioSpecificConfig: 5 bits object
    /// type, 4 bits sampling-frequency index, 4 bits channel config.
    fn parse_sequence_header(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if data.len() < 2 {
            return Err(BitError::from(BitErrorValue::CannotReadByte).into());
        }
        self.profile = (data[0] >> 3) & 0x1f;
        self.sampling_frequency_index = ((data[0] & 0x07) << 1) | (data[1] >> 7);
        self.channel_config = (data[1] >> 3) & 0x0f;

        self.sample_rate = *SAMPLING_FREQUENCIES
            .get(usize::from(self.sampling_frequency_index))
            .ok_or(AacErrorValue::UnsupportedSamplingFrequencyIndex(self.sampling_frequency_index))?;
        Ok(())
    }

    fn parse(&mut self, data: &[u8], out: &mut BytesMut) -> Result<(), Self::Error> {
        self.write_adts_header(data.len(), out);
        out.extend_from_slice(data);
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_44100hz_stereo_asc() {
        let mut parser = AdtsParser::new();
        // AAC-LC, 44100 Hz (index 4), stereo.
        parser.parse_sequence_header(&[0x12, 0x10]).unwrap();
        assert_eq!(parser.sample_rate(), 44100);
        assert_eq!(parser.channel_config, 2);
    }

    #[test]
    fn wraps_raw_frame_with_adts_header() {
        let mut parser = AdtsParser::new();
        parser.parse_sequence_header(&[0x12, 0x10]).unwrap();

        let raw = [0u8; 20];
        let mut out = BytesMut::new();
        parser.parse(&raw, &mut out).unwrap();

        assert_eq!(out.len(), ADTS_HEADER_LEN + raw.len());
        assert_eq!(out[0], 0xff);
        assert_eq!(out[1] & 0xf0, 0xf0);
    }
}
