use thiserror::Error;

/**
    Errors shared by the media crates.
*/
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("codec error: {0}")]
    Codec(String),

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("output buffer too small: frame needs {required} bytes, buffer holds {available}")]
    BufferTooSmall { required: usize, available: usize },
}

impl Error {
    pub fn codec(msg: impl Into<String>) -> Self {
        Self::Codec(msg.into())
    }

    pub fn invalid_data(msg: impl Into<String>) -> Self {
        Self::InvalidData(msg.into())
    }

    pub fn unsupported_format(msg: impl Into<String>) -> Self {
        Self::UnsupportedFormat(msg.into())
    }
}

/**
    Type alias for results that may return an [`Error`].
*/
pub type Result<T> = std::result::Result<T, Error>;
