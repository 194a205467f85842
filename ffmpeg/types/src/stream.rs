/*!
    Stream information types.
*/

use std::time::Duration;

use crate::{CodecId, PixelFormat, Rational, SampleFormat};

/**
    Pick the frame rate to report for a stream.

    Codecs whose regular rate is unreliable use the average rate. Either
    way, an invalid preferred rate falls back to the other one.
*/
pub fn select_frame_rate(
    codec_id: CodecId,
    frame_rate: Option<Rational>,
    avg_frame_rate: Option<Rational>,
) -> Option<Rational> {
    let (preferred, fallback) = if codec_id.has_unreliable_frame_rate() {
        (avg_frame_rate, frame_rate)
    } else {
        (frame_rate, avg_frame_rate)
    };

    preferred
        .filter(|r| r.is_valid())
        .or_else(|| fallback.filter(|r| r.is_valid()))
}

/**
    Information about a video stream.
*/
#[derive(Clone, Debug)]
pub struct VideoStreamInfo {
    /// Container stream index.
    pub index: usize,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Native pixel format, if it is one we know.
    pub pixel_format: Option<PixelFormat>,
    /// Regular frame rate as declared by the container.
    pub frame_rate: Option<Rational>,
    /// Average frame rate as measured by the demuxer.
    pub avg_frame_rate: Option<Rational>,
    /// Time base for timestamps.
    pub time_base: Rational,
    /// Total duration (may be unavailable for some streams).
    pub duration: Option<Duration>,
    /// Codec used.
    pub codec_id: CodecId,
    /// Number of frames according to the container, 0 if unknown.
    pub frame_count: u64,
}

impl VideoStreamInfo {
    /**
        Returns the aspect ratio as a float.
    */
    pub fn aspect_ratio(&self) -> f64 {
        self.width as f64 / self.height as f64
    }

    /**
        Returns the frame rate as fps, or 0.0 when neither rate is known.
    */
    pub fn fps(&self) -> f64 {
        select_frame_rate(self.codec_id, self.frame_rate, self.avg_frame_rate)
            .map(Rational::to_f64)
            .unwrap_or(0.0)
    }
}

/**
    Information about an audio stream.
*/
#[derive(Clone, Debug)]
pub struct AudioStreamInfo {
    /// Container stream index.
    pub index: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Number of channels.
    pub channels: u16,
    /// Sample format, if it is one we know.
    pub sample_format: Option<SampleFormat>,
    /// Time base for timestamps.
    pub time_base: Rational,
    /// Total duration (may be unavailable for some streams).
    pub duration: Option<Duration>,
    /// Codec used.
    pub codec_id: CodecId,
}

/**
    Combined information about a media source.
*/
#[derive(Clone, Debug, Default)]
pub struct MediaInfo {
    /// Total duration of the media (may be unavailable).
    pub duration: Option<Duration>,
    /// Video stream information (if video is present).
    pub video: Option<VideoStreamInfo>,
    /// Audio stream information (if audio is present).
    pub audio: Option<AudioStreamInfo>,
}

impl MediaInfo {
    /**
        Returns true if this media has video.
    */
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    /**
        Returns true if this media has audio.
    */
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_info(codec_id: CodecId) -> VideoStreamInfo {
        VideoStreamInfo {
            index: 0,
            width: 1920,
            height: 1080,
            pixel_format: Some(PixelFormat::Yuv420p),
            frame_rate: Some(Rational::new(60, 1)),
            avg_frame_rate: Some(Rational::new(30, 1)),
            time_base: Rational::new(1, 90000),
            duration: Some(Duration::from_secs(120)),
            codec_id,
            frame_count: 3600,
        }
    }

    #[test]
    fn video_stream_info_aspect_ratio() {
        let aspect = video_info(CodecId::Vp9).aspect_ratio();
        assert!((aspect - 16.0 / 9.0).abs() < 0.01);
    }

    #[test]
    fn h264_uses_average_rate() {
        assert_eq!(video_info(CodecId::H264).fps(), 30.0);
        assert_eq!(video_info(CodecId::H265).fps(), 30.0);
    }

    #[test]
    fn other_codecs_use_regular_rate() {
        assert_eq!(video_info(CodecId::Vp9).fps(), 60.0);
        assert_eq!(video_info(CodecId::Mpeg4).fps(), 60.0);
    }

    #[test]
    fn invalid_preferred_rate_falls_back() {
        let mut info = video_info(CodecId::H264);
        info.avg_frame_rate = Some(Rational::new(0, 0));
        assert_eq!(info.fps(), 60.0);

        info.frame_rate = None;
        assert_eq!(info.fps(), 0.0);
    }

    #[test]
    fn media_info_has_video_audio() {
        let mut info = MediaInfo::default();
        assert!(!info.has_video());
        assert!(!info.has_audio());

        info.video = Some(video_info(CodecId::H264));
        assert!(info.has_video());
        assert!(!info.has_audio());
    }
}
