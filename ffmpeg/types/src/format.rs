/*!
    Pixel and sample format types.
*/

/**
    Size of one plane of an image, without any row padding.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlaneGeometry {
    /// Bytes of pixel data in one row.
    pub row_bytes: usize,
    /// Number of rows.
    pub rows: usize,
}

/**
    Video pixel formats.

    This is a subset of formats commonly produced by software decoders.
    Not all FFmpeg pixel formats are represented.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum PixelFormat {
    /// Planar YUV 4:2:0, 12bpp (most common video format)
    Yuv420p,
    /// Planar YUV 4:2:0, full range (JPEG)
    Yuvj420p,
    /// Planar YUV 4:2:2, 16bpp
    Yuv422p,
    /// Planar YUV 4:2:2, full range (JPEG)
    Yuvj422p,
    /// Planar YUV 4:4:4, 24bpp
    Yuv444p,
    /// Planar YUV 4:4:4, full range (JPEG)
    Yuvj444p,
    /// Semi-planar YUV 4:2:0, 12bpp
    Nv12,
    /// Single luma plane, 8bpp
    Gray8,
    /// Packed RGB, 24bpp
    Rgb24,
    /// Packed BGR, 24bpp
    Bgr24,
    /// Packed RGBA, 32bpp
    Rgba,
    /// Packed BGRA, 32bpp
    Bgra,
}

impl PixelFormat {
    /**
        Returns the number of bits per pixel for this format.

        For subsampled formats, this is the average bits per pixel.
    */
    pub const fn bits_per_pixel(self) -> u32 {
        match self {
            Self::Gray8 => 8,
            Self::Yuv420p | Self::Yuvj420p | Self::Nv12 => 12,
            Self::Yuv422p | Self::Yuvj422p => 16,
            Self::Rgb24 | Self::Bgr24 | Self::Yuv444p | Self::Yuvj444p => 24,
            Self::Bgra | Self::Rgba => 32,
        }
    }

    /**
        Returns true if this is a planar (or semi-planar) format.
    */
    pub const fn is_planar(self) -> bool {
        match self {
            Self::Yuv420p
            | Self::Yuvj420p
            | Self::Yuv422p
            | Self::Yuvj422p
            | Self::Yuv444p
            | Self::Yuvj444p
            | Self::Nv12 => true,
            Self::Gray8 | Self::Rgb24 | Self::Bgr24 | Self::Rgba | Self::Bgra => false,
        }
    }

    /**
        Returns the number of data planes.
    */
    pub const fn plane_count(self) -> usize {
        match self {
            Self::Yuv420p
            | Self::Yuvj420p
            | Self::Yuv422p
            | Self::Yuvj422p
            | Self::Yuv444p
            | Self::Yuvj444p => 3,
            Self::Nv12 => 2,
            Self::Gray8 | Self::Rgb24 | Self::Bgr24 | Self::Rgba | Self::Bgra => 1,
        }
    }

    /**
        Returns the unpadded size of each plane for an image of the given size.

        Subsampled chroma dimensions round up, so odd sizes keep their last
        row and column.
    */
    pub fn plane_geometry(self, width: u32, height: u32) -> Vec<PlaneGeometry> {
        let w = width as usize;
        let h = height as usize;
        let half_w = w.div_ceil(2);
        let half_h = h.div_ceil(2);

        let plane = |row_bytes, rows| PlaneGeometry { row_bytes, rows };

        match self {
            Self::Yuv420p | Self::Yuvj420p => {
                vec![plane(w, h), plane(half_w, half_h), plane(half_w, half_h)]
            }
            Self::Yuv422p | Self::Yuvj422p => {
                vec![plane(w, h), plane(half_w, h), plane(half_w, h)]
            }
            Self::Yuv444p | Self::Yuvj444p => vec![plane(w, h), plane(w, h), plane(w, h)],
            Self::Nv12 => vec![plane(w, h), plane(half_w * 2, half_h)],
            Self::Gray8 => vec![plane(w, h)],
            Self::Rgb24 | Self::Bgr24 => vec![plane(w * 3, h)],
            Self::Rgba | Self::Bgra => vec![plane(w * 4, h)],
        }
    }

    /**
        Returns the number of bytes needed to hold one image, with each row
        padded to a multiple of `align` bytes.

        An `align` of 0 or 1 means tightly packed rows.
    */
    pub fn buffer_size(self, width: u32, height: u32, align: usize) -> usize {
        self.plane_geometry(width, height)
            .iter()
            .map(|p| align_up(p.row_bytes, align) * p.rows)
            .sum()
    }

    /**
        Numeric identifier written to the wire.

        These are the FFmpeg `AVPixelFormat` values, so consumers that already
        understand FFmpeg formats can interpret the field directly.
    */
    pub const fn wire_id(self) -> i32 {
        match self {
            Self::Yuv420p => 0,
            Self::Rgb24 => 2,
            Self::Bgr24 => 3,
            Self::Yuv422p => 4,
            Self::Yuv444p => 5,
            Self::Gray8 => 8,
            Self::Yuvj420p => 12,
            Self::Yuvj422p => 13,
            Self::Yuvj444p => 14,
            Self::Nv12 => 23,
            Self::Rgba => 26,
            Self::Bgra => 28,
        }
    }

    /**
        Inverse of [`PixelFormat::wire_id`].
    */
    pub const fn from_wire_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Self::Yuv420p),
            2 => Some(Self::Rgb24),
            3 => Some(Self::Bgr24),
            4 => Some(Self::Yuv422p),
            5 => Some(Self::Yuv444p),
            8 => Some(Self::Gray8),
            12 => Some(Self::Yuvj420p),
            13 => Some(Self::Yuvj422p),
            14 => Some(Self::Yuvj444p),
            23 => Some(Self::Nv12),
            26 => Some(Self::Rgba),
            28 => Some(Self::Bgra),
            _ => None,
        }
    }

    /**
        Lowercase FFmpeg-style name.
    */
    pub const fn name(self) -> &'static str {
        match self {
            Self::Yuv420p => "yuv420p",
            Self::Yuvj420p => "yuvj420p",
            Self::Yuv422p => "yuv422p",
            Self::Yuvj422p => "yuvj422p",
            Self::Yuv444p => "yuv444p",
            Self::Yuvj444p => "yuvj444p",
            Self::Nv12 => "nv12",
            Self::Gray8 => "gray",
            Self::Rgb24 => "rgb24",
            Self::Bgr24 => "bgr24",
            Self::Rgba => "rgba",
            Self::Bgra => "bgra",
        }
    }
}

fn align_up(value: usize, align: usize) -> usize {
    if align <= 1 {
        value
    } else {
        value.div_ceil(align) * align
    }
}

/**
    Audio sample formats.

    Packed formats interleave all channels in one buffer; planar formats
    (suffix `p`) keep one buffer per channel.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum SampleFormat {
    /// Unsigned 8-bit integer
    U8,
    /// Signed 16-bit integer
    S16,
    /// Signed 32-bit integer
    S32,
    /// Signed 64-bit integer
    S64,
    /// 32-bit floating point, range [-1.0, 1.0]
    F32,
    /// 64-bit floating point
    F64,
    U8p,
    S16p,
    S32p,
    S64p,
    F32p,
    F64p,
}

impl SampleFormat {
    /**
        Returns the number of bytes per sample.
    */
    pub const fn bytes_per_sample(self) -> usize {
        match self {
            Self::U8 | Self::U8p => 1,
            Self::S16 | Self::S16p => 2,
            Self::S32 | Self::S32p | Self::F32 | Self::F32p => 4,
            Self::S64 | Self::S64p | Self::F64 | Self::F64p => 8,
        }
    }

    /**
        Returns true if each channel lives in its own buffer.
    */
    pub const fn is_planar(self) -> bool {
        matches!(
            self,
            Self::U8p | Self::S16p | Self::S32p | Self::S64p | Self::F32p | Self::F64p
        )
    }

    /**
        Numeric identifier written to the wire (the FFmpeg `AVSampleFormat` value).
    */
    pub const fn wire_id(self) -> i32 {
        match self {
            Self::U8 => 0,
            Self::S16 => 1,
            Self::S32 => 2,
            Self::F32 => 3,
            Self::F64 => 4,
            Self::U8p => 5,
            Self::S16p => 6,
            Self::S32p => 7,
            Self::F32p => 8,
            Self::F64p => 9,
            Self::S64 => 10,
            Self::S64p => 11,
        }
    }

    /**
        Inverse of [`SampleFormat::wire_id`].
    */
    pub const fn from_wire_id(id: i32) -> Option<Self> {
        match id {
            0 => Some(Self::U8),
            1 => Some(Self::S16),
            2 => Some(Self::S32),
            3 => Some(Self::F32),
            4 => Some(Self::F64),
            5 => Some(Self::U8p),
            6 => Some(Self::S16p),
            7 => Some(Self::S32p),
            8 => Some(Self::F32p),
            9 => Some(Self::F64p),
            10 => Some(Self::S64),
            11 => Some(Self::S64p),
            _ => None,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::U8 => "u8",
            Self::S16 => "s16",
            Self::S32 => "s32",
            Self::S64 => "s64",
            Self::F32 => "flt",
            Self::F64 => "dbl",
            Self::U8p => "u8p",
            Self::S16p => "s16p",
            Self::S32p => "s32p",
            Self::S64p => "s64p",
            Self::F32p => "fltp",
            Self::F64p => "dblp",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_format_bits_per_pixel() {
        assert_eq!(PixelFormat::Yuv420p.bits_per_pixel(), 12);
        assert_eq!(PixelFormat::Bgra.bits_per_pixel(), 32);
        assert_eq!(PixelFormat::Rgb24.bits_per_pixel(), 24);
    }

    #[test]
    fn pixel_format_is_planar() {
        assert!(PixelFormat::Yuv420p.is_planar());
        assert!(PixelFormat::Nv12.is_planar());
        assert!(!PixelFormat::Bgra.is_planar());
        assert!(!PixelFormat::Rgb24.is_planar());
    }

    #[test]
    fn packed_rgb_buffer_size() {
        assert_eq!(PixelFormat::Rgb24.buffer_size(4, 2, 1), 24);
        assert_eq!(PixelFormat::Bgr24.buffer_size(4, 2, 1), 24);
    }

    #[test]
    fn odd_yuv420p_rounds_chroma_up() {
        let planes = PixelFormat::Yuv420p.plane_geometry(5, 3);
        assert_eq!(planes[0], PlaneGeometry { row_bytes: 5, rows: 3 });
        assert_eq!(planes[1], PlaneGeometry { row_bytes: 3, rows: 2 });
        assert_eq!(planes[2], PlaneGeometry { row_bytes: 3, rows: 2 });
        assert_eq!(PixelFormat::Yuv420p.buffer_size(5, 3, 1), 15 + 6 + 6);
    }

    #[test]
    fn alignment_pads_each_row() {
        // 5 * 3 = 15 bytes per row, padded to 16
        assert_eq!(PixelFormat::Rgb24.buffer_size(5, 2, 16), 32);
        assert_eq!(PixelFormat::Rgb24.buffer_size(5, 2, 0), 30);
    }

    #[test]
    fn pixel_wire_ids_round_trip() {
        for format in [
            PixelFormat::Yuv420p,
            PixelFormat::Rgb24,
            PixelFormat::Bgr24,
            PixelFormat::Nv12,
            PixelFormat::Bgra,
        ] {
            assert_eq!(PixelFormat::from_wire_id(format.wire_id()), Some(format));
        }
        assert_eq!(PixelFormat::from_wire_id(-1), None);
    }

    #[test]
    fn sample_format_bytes_per_sample() {
        assert_eq!(SampleFormat::U8.bytes_per_sample(), 1);
        assert_eq!(SampleFormat::S16.bytes_per_sample(), 2);
        assert_eq!(SampleFormat::S16p.bytes_per_sample(), 2);
        assert_eq!(SampleFormat::F32.bytes_per_sample(), 4);
        assert_eq!(SampleFormat::F64p.bytes_per_sample(), 8);
    }

    #[test]
    fn sample_format_is_planar() {
        assert!(SampleFormat::F32p.is_planar());
        assert!(!SampleFormat::F32.is_planar());
    }

    #[test]
    fn sample_wire_ids_match_ffmpeg() {
        assert_eq!(SampleFormat::S16.wire_id(), 1);
        assert_eq!(SampleFormat::F32p.wire_id(), 8);
        assert_eq!(SampleFormat::from_wire_id(6), Some(SampleFormat::S16p));
    }
}
