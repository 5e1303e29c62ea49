use super::bytes_errors::{BytesReadError, BytesReadErrorValue};
use byteorder::ByteOrder;
use bytes::{Buf, Bytes, BytesMut};

/// A cursor over an in-memory byte sequence, used by codecs that need to
/// peek/advance without owning a full `io::Read` (AMF0, chunk reassembly,
/// MPEG-TS PAT/PMT parsing).
#[derive(Debug, Clone)]
pub struct BytesReader {
    buf: Bytes,
    pos: usize,
}

impl BytesReader {
    #[must_use]
    pub fn new(bytes: BytesMut) -> Self {
        Self {
            buf: bytes.freeze(),
            pos: 0,
        }
    }

    #[must_use]
    pub fn from_bytes(bytes: Bytes) -> Self {
        Self { buf: bytes, pos: 0 }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buf.len() - self.pos
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn require(&self, n: usize) -> Result<(), BytesReadError> {
        if self.len() < n {
            return Err(BytesReadErrorValue::NotEnoughBytes.into());
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, BytesReadError> {
        self.require(1)?;
        let v = self.buf[self.pos];
        self.pos += 1;
        Ok(v)
    }

    pub fn peek_u8(&self) -> Result<u8, BytesReadError> {
        self.require(1)?;
        Ok(self.buf[self.pos])
    }

    pub fn read_u16<T: ByteOrder>(&mut self) -> Result<u16, BytesReadError> {
        self.require(2)?;
        let v = T::read_u16(&self.buf[self.pos..self.pos + 2]);
        self.pos += 2;
        Ok(v)
    }

    pub fn read_u24<T: ByteOrder>(&mut self) -> Result<u32, BytesReadError> {
        self.require(3)?;
        let v = T::read_uint(&self.buf[self.pos..self.pos + 3], 3) as u32;
        self.pos += 3;
        Ok(v)
    }

    pub fn read_u32<T: ByteOrder>(&mut self) -> Result<u32, BytesReadError> {
        self.require(4)?;
        let v = T::read_u32(&self.buf[self.pos..self.pos + 4]);
        self.pos += 4;
        Ok(v)
    }

    pub fn read_u64<T: ByteOrder>(&mut self) -> Result<u64, BytesReadError> {
        self.require(8)?;
        let v = T::read_u64(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(v)
    }

    pub fn read_f64<T: ByteOrder>(&mut self) -> Result<f64, BytesReadError> {
        self.require(8)?;
        let v = T::read_f64(&self.buf[self.pos..self.pos + 8]);
        self.pos += 8;
        Ok(v)
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<Bytes, BytesReadError> {
        self.require(n)?;
        let out = self.buf.slice(self.pos..self.pos + n);
        self.pos += n;
        Ok(out)
    }

    /// Returns the unread remainder without advancing.
    #[must_use]
    pub fn remaining_slice(&self) -> &[u8] {
        &self.buf[self.pos..]
    }

    pub fn advance(&mut self, n: usize) -> Result<(), BytesReadError> {
        self.require(n)?;
        self.pos += n;
        Ok(())
    }

    #[must_use]
    pub fn extract_remaining(&mut self) -> Bytes {
        let out = self.buf.slice(self.pos..);
        self.pos = self.buf.len();
        out
    }
}

impl Buf for BytesReader {
    fn remaining(&self) -> usize {
        self.len()
    }

    fn chunk(&self) -> &[u8] {
        self.remaining_slice()
    }

    fn advance(&mut self, cnt: usize) {
        self.pos += cnt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::BigEndian;

    #[test]
    fn reads_u24_big_endian() {
        let mut r = BytesReader::from_bytes(Bytes::from_static(&[0xAB, 0xCD, 0xEF]));
        assert_eq!(r.read_u24::<BigEndian>().unwrap(), 0x00AB_CDEF);
    }

    #[test]
    fn not_enough_bytes_errors() {
        let mut r = BytesReader::from_bytes(Bytes::from_static(&[0x01]));
        assert!(r.read_u32::<BigEndian>().is_err());
    }

    #[test]
    fn peek_does_not_advance() {
        let mut r = BytesReader::from_bytes(Bytes::from_static(&[0x42, 0x43]));
        assert_eq!(r.peek_u8().unwrap(), 0x42);
        assert_eq!(r.read_u8().unwrap(), 0x42);
        assert_eq!(r.read_u8().unwrap(), 0x43);
    }
}
