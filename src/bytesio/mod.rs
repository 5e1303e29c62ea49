pub mod bits_errors;
pub mod bytes_errors;
pub mod bytes_reader;
pub mod bytes_writer;
pub mod bytesio_errors;

pub use bytes_reader::BytesReader;
pub use bytes_writer::BytesWriter;
