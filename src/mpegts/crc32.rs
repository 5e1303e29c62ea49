//! CRC32/MPEG-2 over PSI section bytes, as required by `pat.rs`/`pmt.rs`
//! (polynomial 0x04C11DB7, MSB-first, no reflection, no final XOR).

use bytes::BytesMut;

fn table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = (i as u32) << 24;
        let mut j = 0;
        while j < 8 {
            crc = if crc & 0x8000_0000 != 0 {
                (crc << 1) ^ 0x04c1_1db7
            } else {
                crc << 1
            };
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

#[must_use]
pub fn gen_crc32(init: u32, data: BytesMut) -> u32 {
    let table = table();
    let mut crc = init;
    for byte in &data {
        let idx = (((crc >> 24) ^ u32::from(*byte)) & 0xff) as usize;
        crc = (crc << 8) ^ table[idx];
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc32_of_empty_is_init_value() {
        assert_eq!(gen_crc32(0xffff_ffff, BytesMut::new()), 0xffff_ffff);
    }

    #[test]
    fn crc32_is_deterministic_for_same_input() {
        let data = BytesMut::from(&[1, 2, 3, 4, 5][..]);
        assert_eq!(gen_crc32(0xffff_ffff, data.clone()), gen_crc32(0xffff_ffff, data));
    }
}
