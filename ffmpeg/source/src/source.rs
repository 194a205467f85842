/*!
    Media source implementation.
*/

use std::path::Path;

use ffmpeg_next::{format::context::Input as InputContext, media::Type};
use tracing::{debug, info};

use ffmpeg_types::{Error, MediaInfo, Packet, Result};

use crate::codec_config::CodecConfig;
use crate::info::extract_media_info;

/**
    Configuration for opening a media source.
*/
#[derive(Clone, Debug, Default)]
pub struct SourceConfig {
    /// Which streams to demux.
    pub stream_filter: StreamFilter,
}

/**
    Filter for selecting which streams to demux.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StreamFilter {
    /// Only demux video streams.
    VideoOnly,
    /// Only demux audio streams.
    AudioOnly,
    /// Demux both video and audio streams.
    #[default]
    Both,
}

impl StreamFilter {
    pub fn wants_video(self) -> bool {
        matches!(self, Self::Both | Self::VideoOnly)
    }

    pub fn wants_audio(self) -> bool {
        matches!(self, Self::Both | Self::AudioOnly)
    }
}

/**
    A selected elementary stream.
*/
struct SelectedStream {
    index: usize,
    codec_config: Option<CodecConfig>,
}

/**
    A media source that produces compressed packets.

    Created by [`Source::open`]. Packets of streams that were
    not selected are skipped.
*/
pub struct Source {
    input: InputContext,
    media_info: MediaInfo,
    video: Option<SelectedStream>,
    audio: Option<SelectedStream>,
    skipped_packets: u64,
}

fn open_input(path: &Path) -> Result<InputContext> {
    ffmpeg_next::init().map_err(|e| Error::codec(e.to_string()))?;

    ffmpeg_next::format::input(&path).map_err(|e| {
        if e.to_string().contains("No such file") {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{}: {e}", path.display()),
            ))
        } else {
            Error::codec(format!("could not open {}: {e}", path.display()))
        }
    })
}

impl Source {
    /**
        Open a media file.

        # Example

        ```ignore
        let source = Source::open("video.mp4", SourceConfig::default())?;
        println!("Duration: {:?}", source.media_info().duration);
        ```
    */
    pub fn open<P: AsRef<Path>>(path: P, config: SourceConfig) -> Result<Self> {
        let path = path.as_ref();
        let input = open_input(path)?;
        let media_info = extract_media_info(&input);

        let select = |kind: Type, wanted: bool| -> Option<SelectedStream> {
            if !wanted {
                return None;
            }
            input.streams().best(kind).map(|stream| SelectedStream {
                index: stream.index(),
                codec_config: Some(CodecConfig::new(stream.parameters())),
            })
        };

        let video = select(Type::Video, config.stream_filter.wants_video());
        let audio = select(Type::Audio, config.stream_filter.wants_audio());

        info!(
            path = %path.display(),
            format = input.format().name(),
            duration = ?media_info.duration,
            "opened input"
        );
        if let (Some(stream), Some(info)) = (&video, &media_info.video) {
            info!(
                index = stream.index,
                codec = ?info.codec_id,
                width = info.width,
                height = info.height,
                pixel_format = info.pixel_format.map(|f| f.name()).unwrap_or("other"),
                fps = info.fps(),
                frames = info.frame_count,
                "video stream"
            );
        }
        if let (Some(stream), Some(info)) = (&audio, &media_info.audio) {
            info!(
                index = stream.index,
                codec = ?info.codec_id,
                sample_rate = info.sample_rate,
                channels = info.channels,
                sample_format = info.sample_format.map(|f| f.name()).unwrap_or("other"),
                "audio stream"
            );
        }

        Ok(Self {
            input,
            media_info,
            video,
            audio,
            skipped_packets: 0,
        })
    }

    /**
        Get the media info for this source.
    */
    pub fn media_info(&self) -> &MediaInfo {
        &self.media_info
    }

    /**
        Index of the selected video stream, if any.
    */
    pub fn video_stream_index(&self) -> Option<usize> {
        self.video.as_ref().map(|s| s.index)
    }

    /**
        Index of the selected audio stream, if any.
    */
    pub fn audio_stream_index(&self) -> Option<usize> {
        self.audio.as_ref().map(|s| s.index)
    }

    /**
        Take the video codec configuration, if video is present.

        Pass this to `ffmpeg-decode` to create a video decoder.
    */
    pub fn take_video_codec_config(&mut self) -> Option<CodecConfig> {
        self.video.as_mut().and_then(|s| s.codec_config.take())
    }

    /**
        Take the audio codec configuration, if audio is present.
    */
    pub fn take_audio_codec_config(&mut self) -> Option<CodecConfig> {
        self.audio.as_mut().and_then(|s| s.codec_config.take())
    }

    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /**
        Number of packets dropped because they belong to unselected streams.
    */
    pub fn skipped_packets(&self) -> u64 {
        self.skipped_packets
    }

    /**
        Read the next packet from the source.

        Returns `Ok(Some(packet))` for each packet, `Ok(None)` at end of
        input. Packets come in file order, interleaved between streams; use
        `packet.stream_index` to route them.
    */
    pub fn next_packet(&mut self) -> Result<Option<Packet>> {
        let video_index = self.video_stream_index();
        let audio_index = self.audio_stream_index();

        loop {
            let (stream, ffmpeg_packet) = match self.input.packets().next() {
                Some(result) => result,
                None => return Ok(None),
            };

            let stream_index = stream.index();
            if Some(stream_index) != video_index && Some(stream_index) != audio_index {
                self.skipped_packets += 1;
                continue;
            }

            let data = ffmpeg_packet.data().map(|d| d.to_vec()).unwrap_or_default();
            debug!(stream_index, size = data.len(), "read packet");

            let packet = Packet::new(stream_index, data)
                .with_timestamps(ffmpeg_packet.pts(), ffmpeg_packet.dts())
                .with_keyframe(ffmpeg_packet.is_key());

            return Ok(Some(packet));
        }
    }
}
