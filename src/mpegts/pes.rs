//! Per-stream PES/elementary-stream bookkeeping referenced by `Pmt` and the
//! TS muxer: one entry per audio/video stream carried in a program.

#[derive(Debug, Clone)]
pub struct Pes {
    pub pid: u16,
    pub codec_id: u8,
    pub continuity_counter: u8,
}

impl Pes {
    #[must_use]
    pub const fn new(pid: u16, codec_id: u8) -> Self {
        Self {
            pid,
            codec_id,
            continuity_counter: 0,
        }
    }

    pub fn next_continuity_counter(&mut self) -> u8 {
        let cc = self.continuity_counter;
        self.continuity_counter = (self.continuity_counter + 1) & 0x0f;
        cc
    }
}
