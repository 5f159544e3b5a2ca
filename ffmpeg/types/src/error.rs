use thiserror::Error;

/**
    Errors produced while opening or reading a video input.

    FFmpeg errors are carried as their rendered message so that this crate
    stays free of FFmpeg bindings.
*/
#[derive(Debug, Error)]
pub enum Error {
    // ── Opening ───────────────────────────────────────────────────────
    #[error("cannot read input: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot open input (does not exist or is no supported format): {0}")]
    Open(String),
    #[error("input contains no readable streams: {0}")]
    StreamInfo(String),
    #[error("no video stream found in the input (probably an audio file)")]
    NoVideoStream,
    #[error("decoder for codec '{0}' is not available")]
    DecoderNotFound(String),
    #[error("cannot set up pixel format conversion: {0}")]
    Conversion(String),
    #[error("allocation failed: {0}")]
    Alloc(&'static str),

    // ── Decoding ──────────────────────────────────────────────────────
    #[error("codec error: {0}")]
    Codec(String),
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("converting picture failed: {0}")]
    Scaling(String),
}

impl Error {
    pub fn open(message: impl Into<String>) -> Self {
        Self::Open(message.into())
    }

    pub fn codec(message: impl Into<String>) -> Self {
        Self::Codec(message.into())
    }

    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion(message.into())
    }

    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData(message.into())
    }

    pub fn scaling(message: impl Into<String>) -> Self {
        Self::Scaling(message.into())
    }

    /**
        Returns true for failures that can only happen while opening an input.
    */
    pub fn is_open_failure(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Open(_)
                | Self::StreamInfo(_)
                | Self::NoVideoStream
                | Self::DecoderNotFound(_)
                | Self::Conversion(_)
                | Self::Alloc(_)
        )
    }
}

/**
    Type alias for results that may return an [`Error`].
*/
pub type Result<T> = std::result::Result<T, Error>;
