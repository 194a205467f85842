/*!
    Video pixel format conversion.
*/

use ffmpeg_next::{
    format::Pixel,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};
use tracing::debug;

use ffmpeg_source::pixel_format_to_ffmpeg;
use ffmpeg_types::{Error, PixelFormat, Result, VideoFrame};

use crate::buffer::{GeometryPolicy, OutputBuffer, OutputBufferManager};

/**
    Scaling algorithm handed to the scaler.

    The converter never resizes, but the algorithm still governs chroma
    resampling between subsampled and full-resolution layouts.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingAlgorithm {
    /// Nearest neighbor - fastest, lowest quality.
    Nearest,
    /// Bilinear interpolation - fast, acceptable quality.
    #[default]
    Bilinear,
    /// Bicubic interpolation - moderate speed, good quality.
    Bicubic,
    /// Lanczos resampling - slowest, highest quality.
    Lanczos,
}

impl ScalingAlgorithm {
    fn to_ffmpeg_flags(self) -> ScalerFlags {
        match self {
            Self::Nearest => ScalerFlags::POINT,
            Self::Bilinear => ScalerFlags::BILINEAR,
            Self::Bicubic => ScalerFlags::BICUBIC,
            Self::Lanczos => ScalerFlags::LANCZOS,
        }
    }
}

/**
    Configuration for video conversion.
*/
#[derive(Clone, Debug)]
pub struct VideoConverterConfig {
    /// Pixel format every frame is converted into.
    pub format: PixelFormat,
    pub algorithm: ScalingAlgorithm,
    pub geometry_policy: GeometryPolicy,
}

impl VideoConverterConfig {
    pub fn new(format: PixelFormat) -> Self {
        Self {
            format,
            algorithm: ScalingAlgorithm::default(),
            geometry_policy: GeometryPolicy::default(),
        }
    }

    /**
        Set the scaling algorithm.
    */
    pub fn with_algorithm(mut self, algorithm: ScalingAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    pub fn with_geometry_policy(mut self, policy: GeometryPolicy) -> Self {
        self.geometry_policy = policy;
        self
    }
}

impl Default for VideoConverterConfig {
    fn default() -> Self {
        Self::new(PixelFormat::Rgb24)
    }
}

/**
    A scaler bound to one source geometry and pixel format, together with
    the FFmpeg frames it reads from and writes into.
*/
pub struct ConversionContext {
    id: u64,
    width: u32,
    height: u32,
    src_format: PixelFormat,
    dst_format: PixelFormat,
    scaler: ScalerContext,
    src: VideoFrameFFmpeg,
    dst: VideoFrameFFmpeg,
}

impl ConversionContext {
    fn new(
        id: u64,
        frame: &VideoFrame,
        dst_format: PixelFormat,
        algorithm: ScalingAlgorithm,
    ) -> Result<Self> {
        let src_pixel = to_ffmpeg(frame.format)?;
        let dst_pixel = to_ffmpeg(dst_format)?;

        let scaler = ScalerContext::get(
            src_pixel,
            frame.width,
            frame.height,
            dst_pixel,
            frame.width,
            frame.height,
            algorithm.to_ffmpeg_flags(),
        )
        .map_err(|e| Error::codec(format!("failed to create scaler: {e}")))?;

        Ok(Self {
            id,
            width: frame.width,
            height: frame.height,
            src_format: frame.format,
            dst_format,
            scaler,
            src: VideoFrameFFmpeg::new(src_pixel, frame.width, frame.height),
            dst: VideoFrameFFmpeg::new(dst_pixel, frame.width, frame.height),
        })
    }

    /**
        Sequence number of this context, starting at 1 for the first one
        created by a converter.
    */
    pub fn id(&self) -> u64 {
        self.id
    }

    fn matches(&self, frame: &VideoFrame) -> bool {
        self.width == frame.width && self.height == frame.height && self.src_format == frame.format
    }

    fn run(&mut self, frame: &VideoFrame, output: &mut OutputBuffer) -> Result<()> {
        let geometry = frame.format.plane_geometry(frame.width, frame.height);
        for (index, plane) in geometry.iter().enumerate() {
            let stride = self.src.stride(index);
            let dst = self.src.data_mut(index);
            for row in 0..plane.rows {
                let src_row = frame.planes[index]
                    .row(row, plane.row_bytes)
                    .ok_or_else(|| Error::invalid_data(format!("plane {index} is short")))?;
                let start = row * stride;
                dst[start..start + plane.row_bytes].copy_from_slice(src_row);
            }
        }

        self.scaler
            .run(&self.src, &mut self.dst)
            .map_err(|e| Error::codec(format!("conversion failed: {e}")))?;

        let geometry = self.dst_format.plane_geometry(self.width, self.height);
        for (index, plane) in geometry.iter().enumerate() {
            let stride = self.dst.stride(index);
            let src = self.dst.data(index);
            let (out, linesize) = output
                .plane_mut(index)
                .ok_or_else(|| Error::invalid_data(format!("output plane {index} missing")))?;
            for row in 0..plane.rows {
                let start = row * stride;
                out[row * linesize..row * linesize + plane.row_bytes]
                    .copy_from_slice(&src[start..start + plane.row_bytes]);
            }
        }

        Ok(())
    }
}

impl std::fmt::Debug for ConversionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConversionContext")
            .field("id", &self.id)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("src_format", &self.src_format)
            .field("dst_format", &self.dst_format)
            .finish_non_exhaustive()
    }
}

fn to_ffmpeg(format: PixelFormat) -> Result<Pixel> {
    match pixel_format_to_ffmpeg(format) {
        Pixel::None => Err(Error::unsupported_format(format!(
            "pixel format {} not supported by the scaler",
            format.name()
        ))),
        pixel => Ok(pixel),
    }
}

/**
    Converts decoded video frames into the configured pixel format.

    The conversion context and output buffer are created on the first
    frame. Later frames with the same geometry and source format reuse both.
    A change in either rebuilds the context; what happens to the buffer
    depends on the [`GeometryPolicy`].
*/
pub struct VideoConverter {
    config: VideoConverterConfig,
    context: Option<ConversionContext>,
    buffers: OutputBufferManager,
    contexts_created: u64,
}

impl VideoConverter {
    pub fn new(config: VideoConverterConfig) -> Self {
        let buffers = OutputBufferManager::new(config.geometry_policy);
        Self {
            config,
            context: None,
            buffers,
            contexts_created: 0,
        }
    }

    pub fn config(&self) -> &VideoConverterConfig {
        &self.config
    }

    pub fn target_format(&self) -> PixelFormat {
        self.config.format
    }

    /**
        Convert one frame and return the filled output buffer.
    */
    pub fn convert(&mut self, frame: &VideoFrame) -> Result<&OutputBuffer> {
        frame.validate()?;

        let output = self
            .buffers
            .get_video_buffer(frame.width, frame.height, self.config.format)?;

        let context = match self.context.take() {
            Some(context) if context.matches(frame) => context,
            stale => {
                self.contexts_created += 1;
                debug!(
                    id = self.contexts_created,
                    width = frame.width,
                    height = frame.height,
                    src = frame.format.name(),
                    dst = self.config.format.name(),
                    replaced = stale.is_some(),
                    "creating conversion context"
                );
                ConversionContext::new(
                    self.contexts_created,
                    frame,
                    self.config.format,
                    self.config.algorithm,
                )?
            }
        };

        let context = self.context.insert(context);
        context.run(frame, output)?;
        Ok(output)
    }

    /**
        Number of conversion contexts built so far.
    */
    pub fn contexts_created(&self) -> u64 {
        self.contexts_created
    }

    /**
        Identity of the live conversion context, if one exists.
    */
    pub fn context_id(&self) -> Option<u64> {
        self.context.as_ref().map(ConversionContext::id)
    }

    pub fn buffer_allocations(&self) -> usize {
        self.buffers.allocations()
    }
}

impl std::fmt::Debug for VideoConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoConverter")
            .field("config", &self.config)
            .field("context", &self.context)
            .field("contexts_created", &self.contexts_created)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_types::Plane;

    use super::*;

    fn solid_rgb(width: u32, height: u32, value: u8) -> VideoFrame {
        let row = width as usize * 3;
        let planes = vec![Plane::new(vec![value; row * height as usize], row)];
        VideoFrame::new(width, height, PixelFormat::Rgb24, planes)
    }

    fn solid_yuv(width: u32, height: u32) -> VideoFrame {
        let planes = PixelFormat::Yuv420p
            .plane_geometry(width, height)
            .iter()
            .map(|p| Plane::new(vec![128; p.row_bytes * p.rows], p.row_bytes))
            .collect();
        VideoFrame::new(width, height, PixelFormat::Yuv420p, planes)
    }

    #[test]
    fn constant_geometry_uses_one_context_and_one_buffer() {
        let mut converter = VideoConverter::new(VideoConverterConfig::new(PixelFormat::Rgb24));
        let frame = solid_yuv(16, 8);

        let first = converter.convert(&frame).unwrap().data().as_ptr();
        for _ in 0..5 {
            let buffer = converter.convert(&frame).unwrap();
            assert_eq!(buffer.data().as_ptr(), first);
            assert_eq!(buffer.len(), 16 * 8 * 3);
        }

        assert_eq!(converter.contexts_created(), 1);
        assert_eq!(converter.context_id(), Some(1));
        assert_eq!(converter.buffer_allocations(), 1);
    }

    #[test]
    fn nothing_is_created_before_first_frame() {
        let converter = VideoConverter::new(VideoConverterConfig::default());
        assert_eq!(converter.contexts_created(), 0);
        assert_eq!(converter.context_id(), None);
        assert_eq!(converter.buffer_allocations(), 0);
    }

    #[test]
    fn rgb_to_bgr_swaps_channels() {
        let row = 16 * 3;
        let mut data = Vec::with_capacity(row * 8);
        for _ in 0..16 * 8 {
            data.extend_from_slice(&[255, 0, 0]);
        }
        let frame = VideoFrame::new(16, 8, PixelFormat::Rgb24, vec![Plane::new(data, row)]);

        let mut converter = VideoConverter::new(VideoConverterConfig::new(PixelFormat::Bgr24));
        let buffer = converter.convert(&frame).unwrap();
        assert_eq!(&buffer.data()[..3], &[0, 0, 255]);
    }

    #[test]
    fn yuv420p_target_is_packed_planes() {
        let mut converter = VideoConverter::new(VideoConverterConfig::new(PixelFormat::Yuv420p));
        let buffer = converter.convert(&solid_rgb(16, 8, 10)).unwrap();
        assert_eq!(buffer.len(), 16 * 8 + 2 * 8 * 4);
        assert_eq!(buffer.planes().len(), 3);
    }

    #[test]
    fn geometry_change_rebuilds_context_and_buffer() {
        let mut converter = VideoConverter::new(VideoConverterConfig::new(PixelFormat::Rgb24));
        converter.convert(&solid_yuv(16, 8)).unwrap();
        let buffer = converter.convert(&solid_yuv(32, 16)).unwrap();
        assert_eq!(buffer.len(), 32 * 16 * 3);

        assert_eq!(converter.contexts_created(), 2);
        assert_eq!(converter.context_id(), Some(2));
        assert_eq!(converter.buffer_allocations(), 2);
    }

    #[test]
    fn source_format_change_rebuilds_context_only() {
        let mut converter = VideoConverter::new(VideoConverterConfig::new(PixelFormat::Rgb24));
        converter.convert(&solid_yuv(16, 8)).unwrap();
        converter.convert(&solid_rgb(16, 8, 0)).unwrap();

        assert_eq!(converter.contexts_created(), 2);
        assert_eq!(converter.buffer_allocations(), 1);
    }

    #[test]
    fn strict_geometry_rejects_growth() {
        let config = VideoConverterConfig::new(PixelFormat::Rgb24)
            .with_geometry_policy(GeometryPolicy::Fail);
        let mut converter = VideoConverter::new(config);
        converter.convert(&solid_yuv(16, 8)).unwrap();

        let err = converter.convert(&solid_yuv(32, 16)).unwrap_err();
        assert!(matches!(err, Error::BufferTooSmall { .. }));
    }

    #[test]
    fn malformed_frame_rejected() {
        let mut converter = VideoConverter::new(VideoConverterConfig::default());
        let frame = VideoFrame::new(16, 8, PixelFormat::Rgb24, vec![Plane::new(vec![0; 10], 48)]);
        assert!(converter.convert(&frame).is_err());
        assert_eq!(converter.buffer_allocations(), 0);
    }
}
