/*!
    Audio decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, decoder::Audio as AudioDecoderFFmpeg},
    util::frame::audio::Audio as AudioFrameFFmpeg,
};
use tracing::trace;

use ffmpeg_source::{CodecConfig, sample_format_from_ffmpeg};
use ffmpeg_types::{AudioFrame, Error, Packet, Result, SampleFormat};

use crate::drive::{DriveState, drive};
use crate::step::{DecodeStep, PacketDecoder};

/**
    Audio decoder.

    Decodes audio packets into frames in the codec's native sample format.
    No resampling or channel interleaving is done.
*/
pub struct AudioDecoder {
    decoder: AudioDecoderFFmpeg,
    decoded: AudioFrameFFmpeg,
    state: DriveState,
    frames: u64,
}

impl AudioDecoder {
    /**
        Create and open an audio decoder from the source's codec configuration.
    */
    pub fn new(codec_config: CodecConfig) -> Result<Self> {
        ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

        let decoder_ctx = codec::context::Context::from_parameters(codec_config.into_parameters())
            .map_err(|e| Error::codec(e.to_string()))?;

        let decoder = decoder_ctx
            .decoder()
            .audio()
            .map_err(|e| Error::codec(format!("failed to open audio codec: {e}")))?;

        Ok(Self {
            decoder,
            decoded: AudioFrameFFmpeg::empty(),
            state: DriveState::default(),
            frames: 0,
        })
    }

    /**
        Copy the last decoded FFmpeg frame into our AudioFrame type.
    */
    fn convert_frame(&self) -> Result<AudioFrame> {
        let frame = &self.decoded;

        let samples = frame.samples();
        let channels = frame.channels();
        if channels == 0 {
            return Err(Error::invalid_data("audio frame has no channels"));
        }

        let ffmpeg_format = frame.format();
        let format = sample_format_from_ffmpeg(ffmpeg_format).ok_or_else(|| {
            Error::unsupported_format(format!("unsupported sample format: {ffmpeg_format:?}"))
        })?;

        let buffers = copy_audio_buffers(frame, format, samples, channels)?;

        let mut output = AudioFrame::new(channels, format, samples, frame.rate(), buffers);
        output.pts = frame.pts();
        Ok(output)
    }
}

/**
    Copy the sample data of each buffer, dropping the decoder's padding.

    In FFmpeg planar audio only linesize[0] is set and it applies to every
    plane, and planes beyond the eighth are only reachable through
    extended_data, so planes are read through raw pointers.
*/
fn copy_audio_buffers(
    frame: &AudioFrameFFmpeg,
    format: SampleFormat,
    samples: usize,
    channels: u16,
) -> Result<Vec<Vec<u8>>> {
    let per_channel = samples * format.bytes_per_sample();
    let (buffer_count, buffer_len) = if format.is_planar() {
        (channels as usize, per_channel)
    } else {
        (1, per_channel * channels as usize)
    };

    // SAFETY: the frame was filled by the decoder; extended_data holds
    // buffer_count valid pointers, each to at least linesize[0] bytes.
    unsafe {
        let raw = frame.as_ptr();
        let linesize = (*raw).linesize[0].max(0) as usize;
        if linesize < buffer_len || (*raw).extended_data.is_null() {
            return Err(Error::invalid_data(format!(
                "audio plane holds {linesize} bytes, expected at least {buffer_len}"
            )));
        }

        (0..buffer_count)
            .map(|index| {
                let ptr = *(*raw).extended_data.add(index);
                if ptr.is_null() {
                    return Err(Error::invalid_data(format!("audio plane {index} is missing")));
                }
                Ok(std::slice::from_raw_parts(ptr, buffer_len).to_vec())
            })
            .collect()
    }
}

impl PacketDecoder for AudioDecoder {
    type Frame = AudioFrame;

    fn decode(&mut self, packet: Option<&Packet>) -> Result<DecodeStep<AudioFrame>> {
        let (consumed, got_frame) =
            drive(&mut self.decoder, &mut self.state, packet, &mut self.decoded)?;

        let frame = if got_frame {
            self.frames += 1;
            let frame = self.convert_frame()?;
            trace!(
                samples = frame.samples,
                channels = frame.channels,
                format = frame.format.name(),
                "decoded audio frame"
            );
            Some(frame)
        } else {
            None
        };

        Ok(DecodeStep::new(consumed, frame))
    }
}

impl std::fmt::Debug for AudioDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDecoder")
            .field("sample_rate", &self.decoder.rate())
            .field("channels", &self.decoder.channels())
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
