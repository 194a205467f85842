/*!
    Conversion utilities between ffmpeg-next types and ffmpeg-types.
*/

use ffmpeg_next::format::{Pixel, Sample, sample::Type as SampleType};

use ffmpeg_types::{CodecId, PixelFormat, Rational, SampleFormat};

/**
    Convert ffmpeg_next::Rational to our Rational.
*/
pub fn rational_from_ffmpeg(r: ffmpeg_next::Rational) -> Rational {
    Rational::new(r.numerator(), r.denominator())
}

/**
    Convert an ffmpeg_next pixel format to our PixelFormat.
*/
pub fn pixel_format_from_ffmpeg(format: Pixel) -> Option<PixelFormat> {
    match format {
        Pixel::YUV420P => Some(PixelFormat::Yuv420p),
        Pixel::YUVJ420P => Some(PixelFormat::Yuvj420p),
        Pixel::YUV422P => Some(PixelFormat::Yuv422p),
        Pixel::YUVJ422P => Some(PixelFormat::Yuvj422p),
        Pixel::YUV444P => Some(PixelFormat::Yuv444p),
        Pixel::YUVJ444P => Some(PixelFormat::Yuvj444p),
        Pixel::NV12 => Some(PixelFormat::Nv12),
        Pixel::GRAY8 => Some(PixelFormat::Gray8),
        Pixel::RGB24 => Some(PixelFormat::Rgb24),
        Pixel::BGR24 => Some(PixelFormat::Bgr24),
        Pixel::RGBA => Some(PixelFormat::Rgba),
        Pixel::BGRA => Some(PixelFormat::Bgra),
        _ => None,
    }
}

/**
    Convert our PixelFormat to an ffmpeg_next pixel format.
*/
pub fn pixel_format_to_ffmpeg(format: PixelFormat) -> Pixel {
    match format {
        PixelFormat::Yuv420p => Pixel::YUV420P,
        PixelFormat::Yuvj420p => Pixel::YUVJ420P,
        PixelFormat::Yuv422p => Pixel::YUV422P,
        PixelFormat::Yuvj422p => Pixel::YUVJ422P,
        PixelFormat::Yuv444p => Pixel::YUV444P,
        PixelFormat::Yuvj444p => Pixel::YUVJ444P,
        PixelFormat::Nv12 => Pixel::NV12,
        PixelFormat::Gray8 => Pixel::GRAY8,
        PixelFormat::Rgb24 => Pixel::RGB24,
        PixelFormat::Bgr24 => Pixel::BGR24,
        PixelFormat::Rgba => Pixel::RGBA,
        PixelFormat::Bgra => Pixel::BGRA,
        _ => Pixel::None,
    }
}

/**
    Convert an ffmpeg_next sample format to our SampleFormat.
*/
pub fn sample_format_from_ffmpeg(format: Sample) -> Option<SampleFormat> {
    let planar = |t: SampleType| t == SampleType::Planar;

    match format {
        Sample::U8(t) if planar(t) => Some(SampleFormat::U8p),
        Sample::U8(_) => Some(SampleFormat::U8),
        Sample::I16(t) if planar(t) => Some(SampleFormat::S16p),
        Sample::I16(_) => Some(SampleFormat::S16),
        Sample::I32(t) if planar(t) => Some(SampleFormat::S32p),
        Sample::I32(_) => Some(SampleFormat::S32),
        Sample::I64(t) if planar(t) => Some(SampleFormat::S64p),
        Sample::I64(_) => Some(SampleFormat::S64),
        Sample::F32(t) if planar(t) => Some(SampleFormat::F32p),
        Sample::F32(_) => Some(SampleFormat::F32),
        Sample::F64(t) if planar(t) => Some(SampleFormat::F64p),
        Sample::F64(_) => Some(SampleFormat::F64),
        _ => None,
    }
}

/**
    Convert an ffmpeg_next codec ID to our CodecId.
*/
pub fn codec_id_from_ffmpeg(id: ffmpeg_next::codec::Id) -> CodecId {
    use ffmpeg_next::codec::Id;

    match id {
        // Video
        Id::H264 => CodecId::H264,
        Id::HEVC => CodecId::H265,
        Id::VP8 => CodecId::Vp8,
        Id::VP9 => CodecId::Vp9,
        Id::AV1 => CodecId::Av1,
        Id::MPEG4 => CodecId::Mpeg4,
        Id::MPEG2VIDEO => CodecId::Mpeg2Video,
        Id::MJPEG => CodecId::Mjpeg,
        // Audio
        Id::AAC => CodecId::Aac,
        Id::OPUS => CodecId::Opus,
        Id::MP3 => CodecId::Mp3,
        Id::VORBIS => CodecId::Vorbis,
        Id::FLAC => CodecId::Flac,
        Id::SHORTEN => CodecId::Shorten,
        Id::PCM_S16LE => CodecId::PcmS16Le,
        Id::PCM_S16BE => CodecId::PcmS16Be,
        Id::PCM_F32LE => CodecId::PcmF32Le,
        Id::AC3 => CodecId::Ac3,
        _ => CodecId::Other,
    }
}
