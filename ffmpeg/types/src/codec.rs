/**
    Codec identifiers the pipeline cares to tell apart.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    // Video
    H264,
    H265,
    Vp8,
    Vp9,
    Av1,
    Mpeg4,
    Mpeg2Video,
    Mjpeg,
    // Audio
    Aac,
    Opus,
    Mp3,
    Vorbis,
    Flac,
    Shorten,
    PcmS16Le,
    PcmS16Be,
    PcmF32Le,
    Ac3,
    /// Anything else FFmpeg can decode.
    Other,
}

impl CodecId {
    /**
        Returns true if the container's regular frame rate for this codec is
        not meaningful and the average frame rate should be used instead.

        H.264 and HEVC streams often report a field rate (or a timebase
        derived guess) as the regular rate.
    */
    pub const fn has_unreliable_frame_rate(self) -> bool {
        matches!(self, Self::H264 | Self::H265)
    }
}
