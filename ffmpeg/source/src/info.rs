/*!
    Container and stream metadata extraction.
*/

use std::time::Duration;

use ffmpeg_next::{format::context::Input as InputContext, format::stream::Stream, media::Type};

use ffmpeg_types::{AudioStreamInfo, MediaInfo, Rational, VideoStreamInfo};

use crate::convert::{
    codec_id_from_ffmpeg, pixel_format_from_ffmpeg, rational_from_ffmpeg,
    sample_format_from_ffmpeg,
};

/**
    Extract MediaInfo from an opened input context without decoding anything.
*/
pub(crate) fn extract_media_info(input_ctx: &InputContext) -> MediaInfo {
    let video = extract_video_stream_info(input_ctx);
    let audio = extract_audio_stream_info(input_ctx);

    let duration = if input_ctx.duration() > 0 {
        Some(Duration::from_micros(input_ctx.duration() as u64))
    } else {
        video
            .as_ref()
            .and_then(|v| v.duration)
            .or_else(|| audio.as_ref().and_then(|a| a.duration))
    };

    MediaInfo {
        duration,
        video,
        audio,
    }
}

fn stream_duration(stream: &Stream, time_base: Rational) -> Option<Duration> {
    if stream.duration() > 0 && time_base.is_valid() {
        let seconds = stream.duration() as f64 * time_base.to_f64();
        Some(Duration::from_secs_f64(seconds))
    } else {
        None
    }
}

fn nonzero_rate(rate: ffmpeg_next::Rational) -> Option<Rational> {
    Some(rational_from_ffmpeg(rate)).filter(|r| r.num != 0)
}

fn extract_video_stream_info(input_ctx: &InputContext) -> Option<VideoStreamInfo> {
    let stream = input_ctx.streams().best(Type::Video)?;
    let time_base = rational_from_ffmpeg(stream.time_base());

    // Width, height and format live on the codec context
    let decoder_ctx =
        ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).ok()?;
    let decoder = decoder_ctx.decoder().video().ok()?;

    Some(VideoStreamInfo {
        index: stream.index(),
        width: decoder.width(),
        height: decoder.height(),
        pixel_format: pixel_format_from_ffmpeg(decoder.format()),
        frame_rate: nonzero_rate(stream.rate()),
        avg_frame_rate: nonzero_rate(stream.avg_frame_rate()),
        time_base,
        duration: stream_duration(&stream, time_base),
        codec_id: codec_id_from_ffmpeg(stream.parameters().id()),
        frame_count: stream.frames().max(0) as u64,
    })
}

fn extract_audio_stream_info(input_ctx: &InputContext) -> Option<AudioStreamInfo> {
    let stream = input_ctx.streams().best(Type::Audio)?;
    let time_base = rational_from_ffmpeg(stream.time_base());

    let decoder_ctx =
        ffmpeg_next::codec::context::Context::from_parameters(stream.parameters()).ok()?;
    let decoder = decoder_ctx.decoder().audio().ok()?;

    Some(AudioStreamInfo {
        index: stream.index(),
        sample_rate: decoder.rate(),
        channels: decoder.channels(),
        sample_format: sample_format_from_ffmpeg(decoder.format()),
        time_base,
        duration: stream_duration(&stream, time_base),
        codec_id: codec_id_from_ffmpeg(stream.parameters().id()),
    })
}
