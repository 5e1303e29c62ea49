use super::bytes_errors::BytesWriteError;
use byteorder::ByteOrder;
use bytes::BytesMut;

/// Accumulates bytes for a wire-format writer (chunk, AMF0, PAT/PMT, FLV tag).
///
/// Mirrors the small helper used across the teacher's mpegts muxers:
/// write primitives append to an internal buffer, `extract_current_bytes`
/// drains it.
#[derive(Debug, Default)]
pub struct BytesWriter {
    buffer: BytesMut,
}

impl BytesWriter {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: BytesMut::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(cap: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(cap),
        }
    }

    pub fn write_u8(&mut self, v: u8) -> Result<(), BytesWriteError> {
        self.buffer.extend_from_slice(&[v]);
        Ok(())
    }

    pub fn write_u16<T: ByteOrder>(&mut self, v: u16) -> Result<(), BytesWriteError> {
        let mut buf = [0u8; 2];
        T::write_u16(&mut buf, v);
        self.buffer.extend_from_slice(&buf);
        Ok(())
    }

    pub fn write_u24<T: ByteOrder>(&mut self, v: u32) -> Result<(), BytesWriteError> {
        let mut buf = [0u8; 3];
        T::write_uint(&mut buf, u64::from(v), 3);
        self.buffer.extend_from_slice(&buf);
        Ok(())
    }

    pub fn write_u32<T: ByteOrder>(&mut self, v: u32) -> Result<(), BytesWriteError> {
        let mut buf = [0u8; 4];
        T::write_u32(&mut buf, v);
        self.buffer.extend_from_slice(&buf);
        Ok(())
    }

    pub fn write_u64<T: ByteOrder>(&mut self, v: u64) -> Result<(), BytesWriteError> {
        let mut buf = [0u8; 8];
        T::write_u64(&mut buf, v);
        self.buffer.extend_from_slice(&buf);
        Ok(())
    }

    pub fn write_f64<T: ByteOrder>(&mut self, v: f64) -> Result<(), BytesWriteError> {
        let mut buf = [0u8; 8];
        T::write_f64(&mut buf, v);
        self.buffer.extend_from_slice(&buf);
        Ok(())
    }

    pub fn write(&mut self, bytes: &[u8]) -> Result<(), BytesWriteError> {
        self.buffer.extend_from_slice(bytes);
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn get_current_bytes(&self) -> BytesMut {
        self.buffer.clone()
    }

    pub fn extract_current_bytes(&mut self) -> BytesMut {
        std::mem::take(&mut self.buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use byteorder::BigEndian;

    #[test]
    fn write_u24_big_endian_keeps_low_three_bytes() {
        let mut w = BytesWriter::new();
        w.write_u24::<BigEndian>(0x00AB_CDEF).unwrap();
        assert_eq!(&w.get_current_bytes()[..], &[0xAB, 0xCD, 0xEF]);
    }

    #[test]
    fn extract_resets_buffer() {
        let mut w = BytesWriter::new();
        w.write_u8(1).unwrap();
        let out = w.extract_current_bytes();
        assert_eq!(&out[..], &[1]);
        assert!(w.is_empty());
    }
}
