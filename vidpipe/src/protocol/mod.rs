/*!
    The record stream protocol.

    Every decoded frame becomes one record: a little-endian length prefix
    that counts the whole record, a tag, fixed-width metadata, and the raw
    frame bytes. Records follow each other with no outer framing; the end
    of the stream is the end of the byte sink.

    ```text
    video: [len u32][tag u32][pixel_format i32][width u32][height u32][frame_count_hint u32][fps f64][pixels]
    audio: [len u32][tag u32][sample_format i32][channels u32][samples u32][channel data]
    ```
*/

mod reader;
mod record;
mod writer;

use thiserror::Error;

pub use self::reader::RecordReader;
pub use self::record::{AudioHeader, Record, VideoHeader};
pub use self::writer::{RecordWriter, WriterStats};

pub const VIDEO_TAG: u32 = 0x2205_7601;
pub const AUDIO_TAG: u32 = 0x2205_7602;

/// Bytes before the pixel payload of a video record.
pub const VIDEO_HEADER_LEN: usize = 32;
/// Bytes before the sample payload of an audio record.
pub const AUDIO_HEADER_LEN: usize = 20;

/**
    Errors produced while writing or reading records.
*/
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("record stream ended inside a record ({needed} more bytes expected)")]
    Truncated { needed: usize },

    #[error("record length {length} is shorter than its {minimum} byte header")]
    LengthTooSmall { length: u32, minimum: usize },

    #[error("unknown record tag {tag:#010x}")]
    UnknownTag { tag: u32 },

    #[error("record of {size} bytes does not fit the length field")]
    PayloadTooLarge { size: usize },

    #[error("invalid payload: {0}")]
    InvalidPayload(String),
}
