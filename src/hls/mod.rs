pub mod errors;
pub mod handlers;
pub mod playlist;
pub mod segment_cache;
pub mod source;

pub use errors::{HlsError, HlsErrorValue};
pub use segment_cache::{Segment, SegmentCache};
pub use source::Source;
