//! MPEG-TS/PSI constants shared by the PAT/PMT/PES muxers.

pub mod epat_pid {
    pub const PAT_TID_PAS: u8 = 0x00;
    pub const PAT_TID_PMS: u8 = 0x02;

    pub const PAT_PID: u16 = 0x0000;
    pub const PMT_PID: u16 = 0x1001;
}

pub mod epsi_stream_type {
    pub const PSI_STREAM_AAC: u8 = 0x0f;
    pub const PSI_STREAM_H264: u8 = 0x1b;
    pub const PSI_STREAM_AUDIO_OPUS: u8 = 0x9c;
    pub const PSI_STREAM_PRIVATE_DATA: u8 = 0x06;
}

pub const TS_PACKET_SIZE: usize = 188;
pub const TS_SYNC_BYTE: u8 = 0x47;

pub const VIDEO_PID: u16 = 0x0100;
pub const AUDIO_PID: u16 = 0x0101;

pub const PES_STREAM_ID_VIDEO: u8 = 0xe0;
pub const PES_STREAM_ID_AUDIO: u8 = 0xc0;
