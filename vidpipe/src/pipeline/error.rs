use std::fmt;

use thiserror::Error;

use crate::protocol::ProtocolError;

/**
    Which elementary stream a decoder belongs to.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Video => f.write_str("video"),
            Self::Audio => f.write_str("audio"),
        }
    }
}

/**
    Errors that end a pipeline run.
*/
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The input has neither a usable video nor audio stream.
    #[error("could not find audio or video stream in the input")]
    NoStreams,

    #[error("failed to open {what}")]
    Open {
        what: String,
        #[source]
        source: ffmpeg_types::Error,
    },

    #[error("failed to read packet")]
    Demux(#[source] ffmpeg_types::Error),

    #[error("error decoding {kind} packet")]
    Decode {
        kind: StreamKind,
        #[source]
        source: ffmpeg_types::Error,
    },

    #[error("{kind} decoder consumed nothing and produced nothing with {remaining} bytes left")]
    Stalled { kind: StreamKind, remaining: usize },

    #[error("failed to convert video frame")]
    Convert(#[source] ffmpeg_types::Error),

    #[error("failed to write record")]
    Protocol(#[from] ProtocolError),
}
