/*!
    Shared types for the vidpipe media crates.

    This crate defines the vocabulary that crosses crate boundaries: formats,
    packets, decoded frames and stream descriptions. It has no dependency on
    FFmpeg, so the pipeline and its tests can use it without FFmpeg bindings.
*/

mod codec;
mod error;
mod format;
mod frame;
mod packet;
mod rational;
mod stream;

pub use self::codec::CodecId;
pub use self::error::{Error, Result};
pub use self::format::{PixelFormat, PlaneGeometry, SampleFormat};
pub use self::frame::{AudioFrame, Plane, VideoFrame};
pub use self::packet::Packet;
pub use self::rational::Rational;
pub use self::stream::{AudioStreamInfo, MediaInfo, VideoStreamInfo, select_frame_rate};
