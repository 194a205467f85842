/*!
    Decoded frame types.
*/

use crate::{Error, PixelFormat, Result, SampleFormat};

/**
    One plane of a decoded video frame.
*/
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plane {
    /// Plane bytes, `linesize` bytes per row.
    pub data: Vec<u8>,
    /// Row stride in bytes. At least the unpadded row width.
    pub linesize: usize,
}

impl Plane {
    pub fn new(data: Vec<u8>, linesize: usize) -> Self {
        Self { data, linesize }
    }

    /**
        Returns row `index`, trimmed to `row_bytes`.
    */
    pub fn row(&self, index: usize, row_bytes: usize) -> Option<&[u8]> {
        let start = index.checked_mul(self.linesize)?;
        self.data.get(start..start.checked_add(row_bytes)?)
    }
}

/**
    A decoded video frame in the decoder's native pixel format.
*/
#[derive(Clone, Debug)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    /// One entry per plane of `format`.
    pub planes: Vec<Plane>,
    pub pts: Option<i64>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, format: PixelFormat, planes: Vec<Plane>) -> Self {
        Self {
            width,
            height,
            format,
            planes,
            pts: None,
        }
    }

    /**
        Check that the planes hold a full image of the declared geometry.
    */
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::invalid_data("frame has zero dimensions"));
        }

        let geometry = self.format.plane_geometry(self.width, self.height);
        if self.planes.len() != geometry.len() {
            return Err(Error::invalid_data(format!(
                "{} frame has {} planes, expected {}",
                self.format.name(),
                self.planes.len(),
                geometry.len()
            )));
        }

        for (index, (plane, expected)) in self.planes.iter().zip(&geometry).enumerate() {
            if plane.linesize < expected.row_bytes {
                return Err(Error::invalid_data(format!(
                    "plane {index} linesize {} is less than row width {}",
                    plane.linesize, expected.row_bytes
                )));
            }
            let needed = plane.linesize * (expected.rows - 1) + expected.row_bytes;
            if plane.data.len() < needed {
                return Err(Error::invalid_data(format!(
                    "plane {index} has {} bytes, expected at least {needed}",
                    plane.data.len()
                )));
            }
        }

        Ok(())
    }
}

/**
    A decoded audio frame.

    Packed formats carry a single buffer with all channels interleaved.
    Planar formats carry one buffer per channel, in channel order.
*/
#[derive(Clone, Debug)]
pub struct AudioFrame {
    pub channels: u16,
    pub format: SampleFormat,
    /// Samples per channel.
    pub samples: usize,
    pub sample_rate: u32,
    pub buffers: Vec<Vec<u8>>,
    pub pts: Option<i64>,
}

impl AudioFrame {
    pub fn new(
        channels: u16,
        format: SampleFormat,
        samples: usize,
        sample_rate: u32,
        buffers: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            channels,
            format,
            samples,
            sample_rate,
            buffers,
            pts: None,
        }
    }

    /**
        Number of buffers the format calls for.
    */
    pub fn expected_buffers(&self) -> usize {
        if self.format.is_planar() {
            self.channels as usize
        } else {
            1
        }
    }

    /**
        Bytes of real sample data in each buffer, excluding any padding the
        decoder added at the end.
    */
    pub fn unpadded_linesize(&self) -> usize {
        let per_channel = self.samples * self.format.bytes_per_sample();
        if self.format.is_planar() {
            per_channel
        } else {
            per_channel * self.channels as usize
        }
    }

    /**
        Iterate the unpadded sample data of each buffer in channel order.
    */
    pub fn unpadded_buffers(&self) -> Result<impl Iterator<Item = &[u8]>> {
        let expected = self.expected_buffers();
        if self.buffers.len() < expected {
            return Err(Error::invalid_data(format!(
                "{} audio frame has {} buffers, expected {expected}",
                self.format.name(),
                self.buffers.len()
            )));
        }

        let linesize = self.unpadded_linesize();
        if let Some(short) = self.buffers[..expected].iter().find(|b| b.len() < linesize) {
            return Err(Error::invalid_data(format!(
                "audio buffer has {} bytes, expected at least {linesize}",
                short.len()
            )));
        }

        Ok(self.buffers[..expected].iter().map(move |b| &b[..linesize]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_audio_linesize_covers_all_channels() {
        let frame = AudioFrame::new(2, SampleFormat::S16, 10, 48000, vec![vec![0; 40]]);
        assert_eq!(frame.expected_buffers(), 1);
        assert_eq!(frame.unpadded_linesize(), 40);
    }

    #[test]
    fn planar_audio_trims_padding() {
        let frame = AudioFrame::new(
            2,
            SampleFormat::S16p,
            5,
            44100,
            vec![vec![1; 16], vec![2; 16]],
        );
        let buffers: Vec<&[u8]> = frame.unpadded_buffers().unwrap().collect();
        assert_eq!(buffers, vec![&[1u8; 10][..], &[2u8; 10][..]]);
    }

    #[test]
    fn planar_audio_missing_channel_is_rejected() {
        let frame = AudioFrame::new(2, SampleFormat::F32p, 4, 48000, vec![vec![0; 16]]);
        assert!(matches!(
            frame.unpadded_buffers().err(),
            Some(Error::InvalidData(_))
        ));
    }

    #[test]
    fn video_frame_validation() {
        let frame = VideoFrame::new(
            4,
            2,
            PixelFormat::Rgb24,
            vec![Plane::new(vec![0; 32], 16)],
        );
        frame.validate().unwrap();

        let short = VideoFrame::new(4, 2, PixelFormat::Rgb24, vec![Plane::new(vec![0; 20], 12)]);
        assert!(short.validate().is_err());

        let narrow = VideoFrame::new(4, 2, PixelFormat::Rgb24, vec![Plane::new(vec![0; 64], 8)]);
        assert!(narrow.validate().is_err());
    }

    #[test]
    fn plane_row_respects_linesize() {
        let plane = Plane::new((0..16).collect(), 8);
        assert_eq!(plane.row(1, 3), Some(&[8u8, 9, 10][..]));
        assert_eq!(plane.row(2, 3), None);
    }
}
