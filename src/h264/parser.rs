//! AVC sequence descriptor and NALU reframing. Parses the
//! AVCDecoderConfigurationRecord embedded in the first video packet of a
//! publication to recover SPS/PPS, then rewrites subsequent AVCC
//! length-prefixed NALUs into Annex-B for the TS muxer (spec §4.6 step 1:
//! "feed to H.264 parser as a sequence descriptor (reports back SPS/PPS to
//! the muxer) and skip further handling").

use bytes::BytesMut;

use super::errors::H264Error;
use crate::bytesio::bits_errors::{BitError, BitErrorValue};
use crate::codec::CodecParser;

const ANNEX_B_START_CODE: [u8; 4] = [0, 0, 0, 1];
const NAL_TYPE_IDR: u8 = 5;

#[derive(Debug, Default, Clone)]
pub struct AvcParser {
    sps: Vec<Vec<u8>>,
    pps: Vec<Vec<u8>>,
    length_size: usize,
}

impl AvcParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            sps: Vec::new(),
            pps: Vec::new(),
            length_size: 4,
        }
    }

    #[must_use]
    pub fn sps(&self) -> &[Vec<u8>] {
        &self.sps
    }

    #[must_use]
    pub fn pps(&self) -> &[Vec<u8>] {
        &self.pps
    }

    fn require(bytes: &[u8], n: usize) -> Result<(), H264Error> {
        if bytes.len() < n {
            return Err(BitError::from(BitErrorValue::CannotReadByte).into());
        }
        Ok(())
    }
}

impl CodecParser for AvcParser {
    type Error = H264Error;

    /// Parses an AVCDecoderConfigurationRecord: 1-byte version, profile,
    /// compat, level, then `0xfc | (lengthSizeMinusOne)`, then
    /// `0xe0 | numOfSPS` followed by length-prefixed SPS entries, then
    /// `numOfPPS` followed by length-prefixed PPS entries.
    fn parse_sequence_header(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        Self::require(data, 6)?;
        self.length_size = usize::from(data[4] & 0x03) + 1;

        let mut pos = 5;
        let num_sps = usize::from(data[pos] & 0x1f);
        pos += 1;
        self.sps.clear();
        for _ in 0..num_sps {
            Self::require(data, pos + 2)?;
            let len = usize::from(u16::from_be_bytes([data[pos], data[pos + 1]]));
            pos += 2;
            Self::require(data, pos + len)?;
            self.sps.push(data[pos..pos + len].to_vec());
            pos += len;
        }

        Self::require(data, pos + 1)?;
        let num_pps = usize::from(data[pos]);
        pos += 1;
        self.pps.clear();
        for _ in 0..num_pps {
            Self::require(data, pos + 2)?;
            let len = usize::from(u16::from_be_bytes([data[pos], data[pos + 1]]));
            pos += 2;
            Self::require(data, pos + len)?;
            self.pps.push(data[pos..pos + len].to_vec());
            pos += len;
        }
        Ok(())
    }

    /// Rewrites one AVCC access unit (possibly several length-prefixed
    /// NALUs) into Annex-B, prefixing SPS/PPS ahead of the first IDR NALU
    /// in the unit so every TS segment starts decodable.
    fn parse(&mut self, data: &[u8], out: &mut BytesMut) -> Result<(), Self::Error> {
        let mut pos = 0;
        while pos + self.length_size <= data.len() {
            let len = match self.length_size {
                1 => usize::from(data[pos]),
                2 => usize::from(u16::from_be_bytes([data[pos], data[pos + 1]])),
                _ => {
                    let mut buf = [0u8; 4];
                    buf[4 - self.length_size..].copy_from_slice(&data[pos..pos + self.length_size]);
                    u32::from_be_bytes(buf) as usize
                }
            };
            pos += self.length_size;
            Self::require(data, pos + len)?;
            let nalu = &data[pos..pos + len];
            pos += len;

            if nalu.is_empty() {
                continue;
            }
            let nal_type = nalu[0] & 0x1f;
            if nal_type == NAL_TYPE_IDR {
                for sps in &self.sps {
                    out.extend_from_slice(&ANNEX_B_START_CODE);
                    out.extend_from_slice(sps);
                }
                for pps in &self.pps {
                    out.extend_from_slice(&ANNEX_B_START_CODE);
                    out.extend_from_slice(pps);
                }
            }
            out.extend_from_slice(&ANNEX_B_START_CODE);
            out.extend_from_slice(nalu);
        }
        Ok(())
    }

    fn sample_rate(&self) -> u32 {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dcr() -> Vec<u8> {
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

    #[test]
    fn parses_sps_and_pps_from_dcr() {
        let mut parser = AvcParser::new();
        parser.parse_sequence_header(&sample_dcr()).unwrap();
        assert_eq!(parser.sps().len(), 1);
        assert_eq!(parser.pps().len(), 1);
        assert_eq!(parser.length_size, 4);
    }

    #[test]
    fn idr_nalu_is_prefixed_with_sps_pps_in_annex_b() {
        let mut parser = AvcParser::new();
        parser.parse_sequence_header(&sample_dcr()).unwrap();

        let idr = [0x65, 0xaa, 0xbb];
        let mut avcc = (idr.len() as u32).to_be_bytes().to_vec();
        avcc.extend_from_slice(&idr);

        let mut out = BytesMut::new();
        parser.parse(&avcc, &mut out).unwrap();

        assert!(out.starts_with(&ANNEX_B_START_CODE));
        assert!(out.windows(idr.len()).any(|w| w == idr));
    }
}
