/*!
    Media decoding for vidpipe.

    This crate turns compressed packets into raw frames. Decoders are driven
    one call at a time through [`PacketDecoder`]: each call reports how many
    packet bytes were consumed and yields at most one frame, which lets the
    caller re-feed partially consumed packets and drain buffered frames.
*/

mod audio;
mod drive;
mod step;
mod video;

pub use self::audio::AudioDecoder;
pub use self::step::{DecodeStep, PacketDecoder};
pub use self::video::VideoDecoder;
