/*!
    Record serialization.
*/

use std::io::Write;

use tracing::trace;

use ffmpeg_transform::OutputBuffer;
use ffmpeg_types::AudioFrame;

use super::{AUDIO_HEADER_LEN, AudioHeader, ProtocolError, VIDEO_HEADER_LEN, VideoHeader};

/**
    Counters for what a [`RecordWriter`] has emitted.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub video_records: u64,
    pub audio_records: u64,
    pub bytes: u64,
}

/**
    Writes records to a byte sink.

    Each record is assembled in a scratch buffer and handed to the sink in
    one `write_all`, so records never interleave at the byte level even if
    the sink is shared.
*/
pub struct RecordWriter<W: Write> {
    sink: W,
    scratch: Vec<u8>,
    stats: WriterStats,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            scratch: Vec::new(),
            stats: WriterStats::default(),
        }
    }

    /**
        Write one video record.
    */
    pub fn write_video(
        &mut self,
        header: &VideoHeader,
        payload: &[u8],
    ) -> Result<(), ProtocolError> {
        let total = record_len(VIDEO_HEADER_LEN, payload.len())?;

        self.scratch.clear();
        header.encode(total, &mut self.scratch);
        self.scratch.extend_from_slice(payload);
        self.emit()?;

        self.stats.video_records += 1;
        trace!(
            width = header.width,
            height = header.height,
            bytes = total,
            "wrote video record"
        );
        Ok(())
    }

    /**
        Write a converted video frame.
    */
    pub fn write_video_buffer(
        &mut self,
        buffer: &OutputBuffer,
        frame_count_hint: u64,
        fps: f64,
    ) -> Result<(), ProtocolError> {
        let header = VideoHeader::new(
            buffer.format(),
            buffer.width(),
            buffer.height(),
            frame_count_hint,
            fps,
        );
        self.write_video(&header, buffer.data())
    }

    /**
        Write one audio record whose payload is the given channel buffers,
        concatenated in order.
    */
    pub fn write_audio<'a, I>(
        &mut self,
        header: &AudioHeader,
        channels: I,
    ) -> Result<(), ProtocolError>
    where
        I: IntoIterator<Item = &'a [u8]>,
    {
        // Length is patched in once the payload size is known
        self.scratch.clear();
        header.encode(0, &mut self.scratch);
        for channel in channels {
            self.scratch.extend_from_slice(channel);
        }

        let total = record_len(AUDIO_HEADER_LEN, self.scratch.len() - AUDIO_HEADER_LEN)?;
        self.scratch[..4].copy_from_slice(&total.to_le_bytes());
        self.emit()?;

        self.stats.audio_records += 1;
        trace!(
            channels = header.channels,
            samples = header.samples,
            bytes = total,
            "wrote audio record"
        );
        Ok(())
    }

    /**
        Write a decoded audio frame.

        Planar frames are written channel after channel, not interleaved.
        Decoder padding at the end of each buffer is dropped.
    */
    pub fn write_audio_frame(&mut self, frame: &AudioFrame) -> Result<(), ProtocolError> {
        let samples = u32::try_from(frame.samples).map_err(|_| {
            ProtocolError::InvalidPayload(format!("{} samples per channel", frame.samples))
        })?;
        let header = AudioHeader::new(frame.format, frame.channels, samples);
        let buffers = frame
            .unpadded_buffers()
            .map_err(|e| ProtocolError::InvalidPayload(e.to_string()))?;
        self.write_audio(&header, buffers)
    }

    fn emit(&mut self) -> Result<(), ProtocolError> {
        self.sink.write_all(&self.scratch)?;
        self.stats.bytes += self.scratch.len() as u64;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), ProtocolError> {
        self.sink.flush()?;
        Ok(())
    }

    pub fn stats(&self) -> WriterStats {
        self.stats
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

fn record_len(header: usize, payload: usize) -> Result<u32, ProtocolError> {
    let size = header + payload;
    u32::try_from(size).map_err(|_| ProtocolError::PayloadTooLarge { size })
}

impl<W: Write> std::fmt::Debug for RecordWriter<W> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordWriter")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_transform::OutputBufferManager;
    use ffmpeg_types::{PixelFormat, SampleFormat};

    use super::super::{AUDIO_TAG, Record, RecordReader, VIDEO_TAG};
    use super::*;

    fn read_u32(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes(bytes[at..at + 4].try_into().unwrap())
    }

    #[test]
    fn packed_audio_record() {
        // Decoders pad buffers; only 40 of these 64 bytes are samples
        let mut buffer: Vec<u8> = (0..40).collect();
        buffer.resize(64, 0xEE);
        let frame = AudioFrame::new(2, SampleFormat::S16, 10, 44100, vec![buffer]);

        let mut writer = RecordWriter::new(Vec::new());
        writer.write_audio_frame(&frame).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(bytes.len(), 60);
        assert_eq!(read_u32(&bytes, 0), 60);
        assert_eq!(read_u32(&bytes, 4), AUDIO_TAG);

        let record = RecordReader::new(bytes.as_slice()).read_record().unwrap().unwrap();
        let Record::Audio { header, payload } = record else {
            panic!("expected audio record");
        };
        assert_eq!(header.channels, 2);
        assert_eq!(header.samples, 10);
        assert_eq!(header.format(), Some(SampleFormat::S16));
        assert_eq!(payload, (0..40).collect::<Vec<u8>>());
    }

    #[test]
    fn planar_audio_concatenates_channels() {
        let mut left = vec![0xA0; 10];
        left.extend_from_slice(&[0; 6]);
        let mut right = vec![0xB1; 10];
        right.extend_from_slice(&[0; 6]);
        let frame = AudioFrame::new(2, SampleFormat::S16p, 5, 48000, vec![left, right]);

        let mut writer = RecordWriter::new(Vec::new());
        writer.write_audio_frame(&frame).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(read_u32(&bytes, 0), 40);
        let payload = &bytes[AUDIO_HEADER_LEN..];
        assert_eq!(payload.len(), 20);
        assert!(payload[..10].iter().all(|&b| b == 0xA0));
        assert!(payload[10..].iter().all(|&b| b == 0xB1));
    }

    #[test]
    fn rgb24_video_record_length() {
        let mut buffers = OutputBufferManager::default();
        let buffer = buffers.get_video_buffer(4, 2, PixelFormat::Rgb24).unwrap();

        let mut writer = RecordWriter::new(Vec::new());
        writer.write_video_buffer(buffer, 10, 30.0).unwrap();
        let bytes = writer.into_inner();

        assert_eq!(bytes.len(), 56);
        assert_eq!(read_u32(&bytes, 0), 56);
        assert_eq!(read_u32(&bytes, 4), VIDEO_TAG);
        assert_eq!(read_u32(&bytes, 12), 4);
        assert_eq!(read_u32(&bytes, 16), 2);
        assert_eq!(read_u32(&bytes, 20), 10);
    }

    #[test]
    fn stats_count_records_and_bytes() {
        let mut writer = RecordWriter::new(Vec::new());
        let header = VideoHeader::new(PixelFormat::Gray8, 2, 2, 0, 0.0);
        writer.write_video(&header, &[1, 2, 3, 4]).unwrap();
        writer
            .write_audio(&AudioHeader::new(SampleFormat::U8, 1, 3), [&[1u8, 2, 3][..]])
            .unwrap();

        let stats = writer.stats();
        assert_eq!(stats.video_records, 1);
        assert_eq!(stats.audio_records, 1);
        assert_eq!(stats.bytes, 36 + 23);
        assert_eq!(stats.bytes, writer.get_ref().len() as u64);
    }

    #[test]
    fn short_audio_buffer_is_rejected() {
        let frame = AudioFrame::new(2, SampleFormat::S16p, 5, 48000, vec![vec![0; 10]]);
        let mut writer = RecordWriter::new(Vec::new());
        assert!(matches!(
            writer.write_audio_frame(&frame),
            Err(ProtocolError::InvalidPayload(_))
        ));
        assert!(writer.get_ref().is_empty());
    }
}
