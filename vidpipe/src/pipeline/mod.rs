/*!
    The decode pipeline.

    Packets flow from a [`PacketSource`] through the decoder of their
    stream. Video frames are converted to the target pixel format; every
    frame becomes one record on the sink. When the source runs dry the
    decoders are drained.
*/

mod decode_loop;
mod error;
mod flush;
mod source;
mod state;

use std::io::Write;
use std::path::Path;

use ffmpeg_decode::{AudioDecoder, VideoDecoder};
use ffmpeg_source::{Source, SourceConfig};

pub use self::decode_loop::decode_packet;
pub use self::error::{PipelineError, StreamKind};
pub use self::flush::{FlushController, FlushState};
pub use self::source::PacketSource;
pub use self::state::{AudioStream, PipelineConfig, PipelineState, PipelineStats, VideoStream};

/**
    Decode the media file at `path` and write its records to `sink`.
*/
pub fn run_file<W: Write>(
    path: &Path,
    config: &PipelineConfig,
    sink: W,
) -> Result<PipelineStats, PipelineError> {
    let source_config = SourceConfig {
        stream_filter: config.stream_filter,
    };
    let mut source = Source::open(path, source_config).map_err(|source| PipelineError::Open {
        what: format!("source file {}", path.display()),
        source,
    })?;

    if !source.has_video() && !source.has_audio() {
        return Err(PipelineError::NoStreams);
    }

    let video = match (source.video_stream_index(), source.take_video_codec_config()) {
        (Some(index), Some(codec_config)) => {
            let decoder = VideoDecoder::new(codec_config).map_err(|source| PipelineError::Open {
                what: "video codec".to_string(),
                source,
            })?;
            let (frame_count, fps) = source
                .media_info()
                .video
                .as_ref()
                .map_or((0, 0.0), |info| (info.frame_count, info.fps()));
            Some(
                VideoStream::new(index, decoder, config.converter_config())
                    .with_stream_info(frame_count, fps),
            )
        }
        _ => None,
    };

    let audio = match (source.audio_stream_index(), source.take_audio_codec_config()) {
        (Some(index), Some(codec_config)) => {
            let decoder = AudioDecoder::new(codec_config).map_err(|source| PipelineError::Open {
                what: "audio codec".to_string(),
                source,
            })?;
            Some(AudioStream::new(index, decoder))
        }
        _ => None,
    };

    let mut state = PipelineState::new(video, audio, sink)?;
    state.run(&mut source)
}
