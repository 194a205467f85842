/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    util::frame::video::Video as VideoFrameFFmpeg,
};
use tracing::trace;

use ffmpeg_source::{CodecConfig, pixel_format_from_ffmpeg};
use ffmpeg_types::{Error, Packet, Plane, Result, VideoFrame};

use crate::drive::{DriveState, drive};
use crate::step::{DecodeStep, PacketDecoder};

/**
    Video decoder.

    Decodes video packets into frames in the codec's native pixel format.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    decoded: VideoFrameFFmpeg,
    state: DriveState,
    frames: u64,
}

impl VideoDecoder {
    /**
        Create and open a video decoder from the source's codec configuration.
    */
    pub fn new(codec_config: CodecConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let decoder_ctx = codec::context::Context::from_parameters(codec_config.into_parameters())
            .map_err(|e| Error::codec(e.to_string()))?;

        let decoder = decoder_ctx
            .decoder()
            .video()
            .map_err(|e| Error::codec(format!("failed to open video codec: {e}")))?;

        Ok(Self {
            decoder,
            decoded: VideoFrameFFmpeg::empty(),
            state: DriveState::default(),
            frames: 0,
        })
    }

    /**
        Copy the last decoded FFmpeg frame into our VideoFrame type.
    */
    fn convert_frame(&self) -> Result<VideoFrame> {
        let frame = &self.decoded;

        let width = frame.width();
        let height = frame.height();
        if width == 0 || height == 0 {
            return Err(Error::invalid_data("frame has zero dimensions"));
        }

        let ffmpeg_format = frame.format();
        let format = pixel_format_from_ffmpeg(ffmpeg_format).ok_or_else(|| {
            Error::unsupported_format(format!("unsupported pixel format: {ffmpeg_format:?}"))
        })?;

        if frame.planes() < format.plane_count() {
            return Err(Error::invalid_data(format!(
                "{} frame has {} planes",
                format.name(),
                frame.planes()
            )));
        }

        let planes = (0..format.plane_count())
            .map(|index| Plane::new(frame.data(index).to_vec(), frame.stride(index)))
            .collect();

        let mut output = VideoFrame::new(width, height, format, planes);
        output.pts = frame.pts();
        Ok(output)
    }
}

impl PacketDecoder for VideoDecoder {
    type Frame = VideoFrame;

    fn decode(&mut self, packet: Option<&Packet>) -> Result<DecodeStep<VideoFrame>> {
        let (consumed, got_frame) =
            drive(&mut self.decoder, &mut self.state, packet, &mut self.decoded)?;

        let frame = if got_frame {
            self.frames += 1;
            let frame = self.convert_frame()?;
            trace!(
                width = frame.width,
                height = frame.height,
                format = frame.format.name(),
                "decoded video frame"
            );
            Some(frame)
        } else {
            None
        };

        Ok(DecodeStep::new(consumed, frame))
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("width", &self.decoder.width())
            .field("height", &self.decoder.height())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
