/*!
    Pipeline state and the per-packet driver.
*/

use std::io::Write;

use tracing::{debug, info};

use ffmpeg_decode::PacketDecoder;
use ffmpeg_source::StreamFilter;
use ffmpeg_transform::{GeometryPolicy, ScalingAlgorithm, VideoConverter, VideoConverterConfig};
use ffmpeg_types::{AudioFrame, Packet, PixelFormat, VideoFrame};

use super::decode_loop::decode_packet;
use super::flush::FlushController;
use super::{PacketSource, PipelineError, StreamKind};
use crate::protocol::RecordWriter;

/**
    Settings for one pipeline run.
*/
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Pixel format video frames are converted to before they are written.
    pub target_format: PixelFormat,
    pub algorithm: ScalingAlgorithm,
    pub geometry_policy: GeometryPolicy,
    pub stream_filter: StreamFilter,
}

impl PipelineConfig {
    pub fn converter_config(&self) -> VideoConverterConfig {
        VideoConverterConfig::new(self.target_format)
            .with_algorithm(self.algorithm)
            .with_geometry_policy(self.geometry_policy)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_format: PixelFormat::Rgb24,
            algorithm: ScalingAlgorithm::default(),
            geometry_policy: GeometryPolicy::default(),
            stream_filter: StreamFilter::default(),
        }
    }
}

/**
    Counters collected over a run.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineStats {
    pub packets_read: u64,
    /// Packets belonging to no decoded stream.
    pub packets_skipped: u64,
    /// Decoder calls made while feeding packets.
    pub decoder_calls: u64,
    pub video_frames: u64,
    pub audio_frames: u64,
    /// Decoder calls made while draining.
    pub flush_calls: u64,
    pub bytes_written: u64,
}

/**
    The video half of a pipeline: decoder, converter and what the header
    needs to know about the stream.
*/
pub struct VideoStream<D> {
    index: usize,
    decoder: D,
    converter: VideoConverter,
    frame_count_hint: u64,
    fps: f64,
    flush: FlushController,
}

impl<D> VideoStream<D> {
    pub fn new(index: usize, decoder: D, config: VideoConverterConfig) -> Self {
        Self {
            index,
            decoder,
            converter: VideoConverter::new(config),
            frame_count_hint: 0,
            fps: 0.0,
            flush: FlushController::new(),
        }
    }

    /**
        Set the frame count and rate written into every video header.
    */
    pub fn with_stream_info(mut self, frame_count_hint: u64, fps: f64) -> Self {
        self.frame_count_hint = frame_count_hint;
        self.fps = fps;
        self
    }

    pub fn converter(&self) -> &VideoConverter {
        &self.converter
    }
}

pub struct AudioStream<D> {
    index: usize,
    decoder: D,
    flush: FlushController,
}

impl<D> AudioStream<D> {
    pub fn new(index: usize, decoder: D) -> Self {
        Self {
            index,
            decoder,
            flush: FlushController::new(),
        }
    }
}

/**
    Everything a run owns: the decoders of the selected streams, the video
    converter with its buffer, and the record writer.

    Either stream may be absent, but not both.
*/
pub struct PipelineState<V, A, W: Write> {
    video: Option<VideoStream<V>>,
    audio: Option<AudioStream<A>>,
    writer: RecordWriter<W>,
    stats: PipelineStats,
}

impl<V, A, W> PipelineState<V, A, W>
where
    V: PacketDecoder<Frame = VideoFrame>,
    A: PacketDecoder<Frame = AudioFrame>,
    W: Write,
{
    pub fn new(
        video: Option<VideoStream<V>>,
        audio: Option<AudioStream<A>>,
        sink: W,
    ) -> Result<Self, PipelineError> {
        if video.is_none() && audio.is_none() {
            return Err(PipelineError::NoStreams);
        }

        Ok(Self {
            video,
            audio,
            writer: RecordWriter::new(sink),
            stats: PipelineStats::default(),
        })
    }

    pub fn stats(&self) -> PipelineStats {
        self.stats
    }

    pub fn video(&self) -> Option<&VideoStream<V>> {
        self.video.as_ref()
    }

    /**
        Decode one packet and write a record for every frame it yields.
    */
    pub fn process_packet(&mut self, mut packet: Packet) -> Result<(), PipelineError> {
        let index = packet.stream_index;
        let writer = &mut self.writer;
        let stats = &mut self.stats;

        if let Some(video) = self.video.as_mut().filter(|v| v.index == index) {
            let VideoStream {
                decoder,
                converter,
                frame_count_hint,
                fps,
                ..
            } = video;
            let calls = decode_packet(decoder, &mut packet, StreamKind::Video, |frame| {
                write_video_frame(converter, writer, *frame_count_hint, *fps, &frame)?;
                stats.video_frames += 1;
                Ok(())
            })?;
            stats.decoder_calls += calls;
        } else if let Some(audio) = self.audio.as_mut().filter(|a| a.index == index) {
            let calls = decode_packet(&mut audio.decoder, &mut packet, StreamKind::Audio, |frame| {
                writer.write_audio_frame(&frame)?;
                stats.audio_frames += 1;
                Ok(())
            })?;
            stats.decoder_calls += calls;
        } else {
            debug!(index, "skipping packet of unselected stream");
            stats.packets_skipped += 1;
        }

        Ok(())
    }

    /**
        Drain both decoders and flush the sink.
    */
    pub fn finish(&mut self) -> Result<(), PipelineError> {
        let writer = &mut self.writer;
        let stats = &mut self.stats;

        if let Some(video) = self.video.as_mut() {
            let VideoStream {
                decoder,
                converter,
                frame_count_hint,
                fps,
                flush,
                ..
            } = video;
            let before = flush.calls();
            flush.drain(decoder, StreamKind::Video, |frame| {
                write_video_frame(converter, writer, *frame_count_hint, *fps, &frame)?;
                stats.video_frames += 1;
                Ok(())
            })?;
            stats.flush_calls += flush.calls() - before;
        }

        if let Some(audio) = self.audio.as_mut() {
            let before = audio.flush.calls();
            audio.flush.drain(&mut audio.decoder, StreamKind::Audio, |frame| {
                writer.write_audio_frame(&frame)?;
                stats.audio_frames += 1;
                Ok(())
            })?;
            stats.flush_calls += audio.flush.calls() - before;
        }

        writer.flush()?;
        stats.bytes_written = writer.stats().bytes;
        Ok(())
    }

    /**
        Process every packet of `source`, then drain the decoders.
    */
    pub fn run<S: PacketSource>(&mut self, source: &mut S) -> Result<PipelineStats, PipelineError> {
        while let Some(packet) = source.next_packet().map_err(PipelineError::Demux)? {
            self.stats.packets_read += 1;
            self.process_packet(packet)?;
        }
        self.stats.packets_skipped += source.skipped_packets();

        self.finish()?;

        let stats = self.stats;
        info!(
            packets = stats.packets_read,
            skipped = stats.packets_skipped,
            decoder_calls = stats.decoder_calls,
            flush_calls = stats.flush_calls,
            video_frames = stats.video_frames,
            audio_frames = stats.audio_frames,
            bytes = stats.bytes_written,
            "pipeline finished"
        );
        Ok(stats)
    }
}

fn write_video_frame<W: Write>(
    converter: &mut VideoConverter,
    writer: &mut RecordWriter<W>,
    frame_count_hint: u64,
    fps: f64,
    frame: &VideoFrame,
) -> Result<(), PipelineError> {
    let buffer = converter.convert(frame).map_err(PipelineError::Convert)?;
    writer.write_video_buffer(buffer, frame_count_hint, fps)?;
    Ok(())
}
