pub mod crc32;
pub mod define;
pub mod errors;
pub mod pat;
pub mod pes;
pub mod pmt;
pub mod ts;

pub use errors::MpegTsError;
pub use pat::{Pat, PatMuxer};
pub use pes::Pes;
pub use pmt::{Pmt, PmtMuxer};
pub use ts::TsMuxer;
