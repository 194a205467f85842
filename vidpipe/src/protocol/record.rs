/*!
    Record headers and their byte layout.
*/

use ffmpeg_types::{PixelFormat, SampleFormat};

use super::{AUDIO_HEADER_LEN, AUDIO_TAG, ProtocolError, VIDEO_HEADER_LEN, VIDEO_TAG};

/**
    Metadata carried by a video record.
*/
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VideoHeader {
    /// Wire id of the payload's pixel format.
    pub pixel_format: i32,
    pub width: u32,
    pub height: u32,
    /// Frame count the container declared for the stream, 0 if unknown.
    pub frame_count_hint: u32,
    pub fps: f64,
}

impl VideoHeader {
    /**
        Build a header for a frame of a known pixel format.

        `frame_count_hint` saturates at `u32::MAX`.
    */
    pub fn new(
        format: PixelFormat,
        width: u32,
        height: u32,
        frame_count_hint: u64,
        fps: f64,
    ) -> Self {
        Self {
            pixel_format: format.wire_id(),
            width,
            height,
            frame_count_hint: u32::try_from(frame_count_hint).unwrap_or(u32::MAX),
            fps,
        }
    }

    pub fn format(&self) -> Option<PixelFormat> {
        PixelFormat::from_wire_id(self.pixel_format)
    }

    pub(crate) fn encode(&self, total_len: u32, out: &mut Vec<u8>) {
        out.extend_from_slice(&total_len.to_le_bytes());
        out.extend_from_slice(&VIDEO_TAG.to_le_bytes());
        out.extend_from_slice(&self.pixel_format.to_le_bytes());
        out.extend_from_slice(&self.width.to_le_bytes());
        out.extend_from_slice(&self.height.to_le_bytes());
        out.extend_from_slice(&self.frame_count_hint.to_le_bytes());
        out.extend_from_slice(&self.fps.to_le_bytes());
    }

    /**
        Parse the fields that follow the length and tag.
    */
    pub(crate) fn decode(fields: &[u8; VIDEO_HEADER_LEN - 8]) -> Self {
        Self {
            pixel_format: i32::from_le_bytes(word(fields, 0)),
            width: u32::from_le_bytes(word(fields, 4)),
            height: u32::from_le_bytes(word(fields, 8)),
            frame_count_hint: u32::from_le_bytes(word(fields, 12)),
            fps: f64::from_le_bytes([
                fields[16], fields[17], fields[18], fields[19], fields[20], fields[21], fields[22],
                fields[23],
            ]),
        }
    }

    /**
        Check a payload length against the geometry, when the format is known.
    */
    pub(crate) fn check_payload(&self, len: usize) -> Result<(), ProtocolError> {
        let Some(format) = self.format() else {
            return Ok(());
        };
        let expected = format.buffer_size(self.width, self.height, 1);
        if len != expected {
            return Err(ProtocolError::InvalidPayload(format!(
                "{}x{} {} frame needs {expected} bytes, record carries {len}",
                self.width,
                self.height,
                format.name()
            )));
        }
        Ok(())
    }
}

/**
    Metadata carried by an audio record.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AudioHeader {
    /// Wire id of the payload's sample format.
    pub sample_format: i32,
    pub channels: u32,
    /// Samples per channel.
    pub samples: u32,
}

impl AudioHeader {
    pub fn new(format: SampleFormat, channels: u16, samples: u32) -> Self {
        Self {
            sample_format: format.wire_id(),
            channels: u32::from(channels),
            samples,
        }
    }

    pub fn format(&self) -> Option<SampleFormat> {
        SampleFormat::from_wire_id(self.sample_format)
    }

    pub(crate) fn encode(&self, total_len: u32, out: &mut Vec<u8>) {
        out.extend_from_slice(&total_len.to_le_bytes());
        out.extend_from_slice(&AUDIO_TAG.to_le_bytes());
        out.extend_from_slice(&self.sample_format.to_le_bytes());
        out.extend_from_slice(&self.channels.to_le_bytes());
        out.extend_from_slice(&self.samples.to_le_bytes());
    }

    pub(crate) fn decode(fields: &[u8; AUDIO_HEADER_LEN - 8]) -> Self {
        Self {
            sample_format: i32::from_le_bytes(word(fields, 0)),
            channels: u32::from_le_bytes(word(fields, 4)),
            samples: u32::from_le_bytes(word(fields, 8)),
        }
    }

    pub(crate) fn check_payload(&self, len: usize) -> Result<(), ProtocolError> {
        let Some(format) = self.format() else {
            return Ok(());
        };
        let expected = self.channels as usize * self.samples as usize * format.bytes_per_sample();
        if len != expected {
            return Err(ProtocolError::InvalidPayload(format!(
                "{} channels of {} {} samples need {expected} bytes, record carries {len}",
                self.channels,
                self.samples,
                format.name()
            )));
        }
        Ok(())
    }
}

fn word(bytes: &[u8], at: usize) -> [u8; 4] {
    [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]
}

/**
    One parsed record.
*/
#[derive(Clone, Debug, PartialEq)]
pub enum Record {
    Video { header: VideoHeader, payload: Vec<u8> },
    Audio { header: AudioHeader, payload: Vec<u8> },
}

impl Record {
    pub fn payload(&self) -> &[u8] {
        match self {
            Self::Video { payload, .. } | Self::Audio { payload, .. } => payload,
        }
    }

    pub fn tag(&self) -> u32 {
        match self {
            Self::Video { .. } => VIDEO_TAG,
            Self::Audio { .. } => AUDIO_TAG,
        }
    }

    /**
        Value of the record's length field.
    */
    pub fn total_len(&self) -> usize {
        let header = match self {
            Self::Video { .. } => VIDEO_HEADER_LEN,
            Self::Audio { .. } => AUDIO_HEADER_LEN,
        };
        header + self.payload().len()
    }
}
