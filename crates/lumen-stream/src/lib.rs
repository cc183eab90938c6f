//! Byte-range parsing and chunked file bodies.

pub mod body;
pub mod range;
pub mod response;

pub use body::{chunk_stream, ChunkStream};
pub use range::{parse_range, unsatisfied_content_range, ByteRange};
pub use response::{open_stream, Delivery, FileStream, StreamPlan};
