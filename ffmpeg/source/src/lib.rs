/*!
    Input opening and demuxing for the video input crates.

    This crate handles the input side of the pipeline. It opens media from a
    path, a URL or a caller-supplied [`ByteSource`], parses the container,
    selects the first video stream and produces its encoded packets.
*/

mod byte_source;
mod codec_config;
mod convert;
mod init;
mod probe;
mod source;

pub use self::byte_source::ByteSource;
pub use self::codec_config::CodecConfig;
pub use self::convert::{pixel_format_from_ffmpeg, rational_from_ffmpeg};
pub use self::init::{LogLevel, init};
pub use self::source::{DEFAULT_IO_BUFFER_SIZE, Source, SourceConfig, open};

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;
