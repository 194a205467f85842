/*!
    Media source and demuxing for vidpipe.

    This crate handles the input side of the pipeline. It opens a container,
    picks the best video and audio streams, and produces compressed packets
    tagged with their stream index for the decoders downstream.
*/

mod codec_config;
mod convert;
mod info;
mod source;

pub use self::codec_config::CodecConfig;
pub use self::convert::{
    codec_id_from_ffmpeg, pixel_format_from_ffmpeg, pixel_format_to_ffmpeg, rational_from_ffmpeg,
    sample_format_from_ffmpeg,
};
pub use self::source::{Source, SourceConfig, StreamFilter};
