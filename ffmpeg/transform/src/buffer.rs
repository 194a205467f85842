/*!
    Reusable output buffers for converted video frames.
*/

use tracing::debug;

use ffmpeg_types::{Error, PixelFormat, Result};

/**
    Row alignment used when sizing output buffers.

    Rows are tightly packed, which is also what the record protocol carries.
*/
pub const BUFFER_ALIGN: usize = 1;

/**
    Position of one plane inside an [`OutputBuffer`].
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneLayout {
    pub offset: usize,
    pub linesize: usize,
    pub rows: usize,
}

impl PlaneLayout {
    pub fn len(&self) -> usize {
        self.linesize * self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/**
    What to do when a frame arrives whose geometry differs from the one the
    buffer was allocated for.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GeometryPolicy {
    /// Allocate a new buffer sized for the new geometry.
    #[default]
    Reallocate,
    /// Keep the first allocation. Frames that fit are laid out inside it,
    /// larger frames are an error.
    Fail,
}

/**
    One frame's worth of converted pixel data plus its per-plane layout.
*/
#[derive(Debug)]
pub struct OutputBuffer {
    width: u32,
    height: u32,
    format: PixelFormat,
    storage: Vec<u8>,
    len: usize,
    planes: Vec<PlaneLayout>,
}

impl OutputBuffer {
    fn allocate(width: u32, height: u32, format: PixelFormat) -> Self {
        let mut buffer = Self {
            width,
            height,
            format,
            storage: Vec::new(),
            len: 0,
            planes: Vec::new(),
        };
        buffer.lay_out(width, height, format);
        buffer.storage = vec![0; buffer.len];
        buffer
    }

    /**
        Recompute the plane layout for a geometry. Does not touch storage.
    */
    fn lay_out(&mut self, width: u32, height: u32, format: PixelFormat) {
        self.width = width;
        self.height = height;
        self.format = format;
        self.planes.clear();

        let mut offset = 0;
        for geometry in format.plane_geometry(width, height) {
            let linesize = geometry.row_bytes.next_multiple_of(BUFFER_ALIGN.max(1));
            let plane = PlaneLayout {
                offset,
                linesize,
                rows: geometry.rows,
            };
            offset += plane.len();
            self.planes.push(plane);
        }
        self.len = offset;
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    /**
        Bytes of the current frame, all planes in order.
    */
    pub fn data(&self) -> &[u8] {
        &self.storage[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /**
        Bytes allocated, which can exceed [`OutputBuffer::len`] under
        [`GeometryPolicy::Fail`] after a shrink.
    */
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn planes(&self) -> &[PlaneLayout] {
        &self.planes
    }

    /**
        Mutable view of one plane, with its linesize.
    */
    pub fn plane_mut(&mut self, index: usize) -> Option<(&mut [u8], usize)> {
        let plane = *self.planes.get(index)?;
        let bytes = &mut self.storage[plane.offset..plane.offset + plane.len()];
        Some((bytes, plane.linesize))
    }

    fn matches(&self, width: u32, height: u32, format: PixelFormat) -> bool {
        self.width == width && self.height == height && self.format == format
    }
}

/**
    Owns the output buffer of one video stream.

    The buffer is created on the first request, then handed back unchanged
    for every later request with the same geometry.
*/
#[derive(Debug, Default)]
pub struct OutputBufferManager {
    policy: GeometryPolicy,
    buffer: Option<OutputBuffer>,
    allocations: usize,
}

impl OutputBufferManager {
    pub fn new(policy: GeometryPolicy) -> Self {
        Self {
            policy,
            buffer: None,
            allocations: 0,
        }
    }

    pub fn policy(&self) -> GeometryPolicy {
        self.policy
    }

    /**
        Number of buffers allocated so far.
    */
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    pub fn buffer(&self) -> Option<&OutputBuffer> {
        self.buffer.as_ref()
    }

    /**
        Get the buffer for a frame of the given geometry and format.

        Returns [`Error::BufferTooSmall`] under [`GeometryPolicy::Fail`] when
        the frame needs more bytes than the first allocation holds.
    */
    pub fn get_video_buffer(
        &mut self,
        width: u32,
        height: u32,
        format: PixelFormat,
    ) -> Result<&mut OutputBuffer> {
        if width == 0 || height == 0 {
            return Err(Error::invalid_data("output buffer requested with zero dimensions"));
        }

        let buffer = match self.buffer.take() {
            Some(buffer) if buffer.matches(width, height, format) => buffer,
            Some(mut buffer) => match self.policy {
                GeometryPolicy::Reallocate => {
                    debug!(
                        old_width = buffer.width,
                        old_height = buffer.height,
                        width,
                        height,
                        format = format.name(),
                        "frame geometry changed, reallocating output buffer"
                    );
                    self.allocations += 1;
                    OutputBuffer::allocate(width, height, format)
                }
                GeometryPolicy::Fail => {
                    let required = format.buffer_size(width, height, BUFFER_ALIGN);
                    let available = buffer.capacity();
                    if required > available {
                        self.buffer = Some(buffer);
                        return Err(Error::BufferTooSmall {
                            required,
                            available,
                        });
                    }
                    buffer.lay_out(width, height, format);
                    buffer
                }
            },
            None => {
                debug!(
                    width,
                    height,
                    format = format.name(),
                    size = format.buffer_size(width, height, BUFFER_ALIGN),
                    "allocating output buffer"
                );
                self.allocations += 1;
                OutputBuffer::allocate(width, height, format)
            }
        };

        Ok(self.buffer.insert(buffer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_request_allocates_exact_size() {
        let mut manager = OutputBufferManager::default();
        let buffer = manager.get_video_buffer(4, 2, PixelFormat::Rgb24).unwrap();
        assert_eq!(buffer.len(), 24);
        assert_eq!(buffer.planes().len(), 1);
        assert_eq!(manager.allocations(), 1);
    }

    #[test]
    fn planar_layout_places_planes_back_to_back() {
        let mut manager = OutputBufferManager::default();
        let buffer = manager.get_video_buffer(5, 3, PixelFormat::Yuv420p).unwrap();
        let planes = buffer.planes();
        assert_eq!(planes[0], PlaneLayout { offset: 0, linesize: 5, rows: 3 });
        assert_eq!(planes[1], PlaneLayout { offset: 15, linesize: 3, rows: 2 });
        assert_eq!(planes[2], PlaneLayout { offset: 21, linesize: 3, rows: 2 });
        assert_eq!(buffer.len(), 27);
    }

    #[test]
    fn same_geometry_reuses_buffer() {
        let mut manager = OutputBufferManager::default();
        let first = manager.get_video_buffer(8, 8, PixelFormat::Bgr24).unwrap().data().as_ptr();
        for _ in 0..10 {
            let again = manager.get_video_buffer(8, 8, PixelFormat::Bgr24).unwrap();
            assert_eq!(again.data().as_ptr(), first);
        }
        assert_eq!(manager.allocations(), 1);
    }

    #[test]
    fn reallocate_policy_follows_geometry() {
        let mut manager = OutputBufferManager::new(GeometryPolicy::Reallocate);
        manager.get_video_buffer(4, 4, PixelFormat::Rgb24).unwrap();
        let buffer = manager.get_video_buffer(8, 4, PixelFormat::Rgb24).unwrap();
        assert_eq!(buffer.len(), 96);
        assert_eq!(manager.allocations(), 2);
    }

    #[test]
    fn fail_policy_rejects_larger_frame() {
        let mut manager = OutputBufferManager::new(GeometryPolicy::Fail);
        manager.get_video_buffer(4, 4, PixelFormat::Rgb24).unwrap();
        let err = manager.get_video_buffer(8, 4, PixelFormat::Rgb24).unwrap_err();
        assert!(matches!(
            err,
            Error::BufferTooSmall {
                required: 96,
                available: 48
            }
        ));
        // The original buffer survives the failed request
        assert_eq!(manager.buffer().map(OutputBuffer::len), Some(48));
    }

    #[test]
    fn fail_policy_fits_smaller_frame_in_place() {
        let mut manager = OutputBufferManager::new(GeometryPolicy::Fail);
        manager.get_video_buffer(4, 4, PixelFormat::Rgb24).unwrap();
        let buffer = manager.get_video_buffer(2, 2, PixelFormat::Rgb24).unwrap();
        assert_eq!(buffer.len(), 12);
        assert_eq!(buffer.capacity(), 48);
        assert_eq!(manager.allocations(), 1);
    }

    #[test]
    fn plane_mut_covers_plane() {
        let mut manager = OutputBufferManager::default();
        let buffer = manager.get_video_buffer(4, 2, PixelFormat::Nv12).unwrap();
        let (uv, linesize) = buffer.plane_mut(1).unwrap();
        assert_eq!(linesize, 4);
        assert_eq!(uv.len(), 4);
        assert!(buffer.plane_mut(2).is_none());
    }

    #[test]
    fn zero_dimensions_rejected() {
        let mut manager = OutputBufferManager::default();
        assert!(manager.get_video_buffer(0, 4, PixelFormat::Rgb24).is_err());
        assert_eq!(manager.allocations(), 0);
    }
}
