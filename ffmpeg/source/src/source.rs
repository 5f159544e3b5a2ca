/*!
    Media source implementation.
*/

use std::path::Path;
use std::ptr;

use ffmpeg_next::{ffi, format::context::Input as InputContext};
use tracing::{debug, trace};

use ffmpeg_types::{Error, Result, VideoStreamInfo};

use crate::byte_source::{ByteSource, CustomIo};
use crate::codec_config::CodecConfig;
use crate::init::{LogLevel, init};
use crate::probe::{extract_video_stream_info, first_video_stream};

/**
    Default size of the buffer FFmpeg reads byte sources into.
*/
pub const DEFAULT_IO_BUFFER_SIZE: usize = 4096;

/**
    Configuration for opening a media source.
*/
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Buffer size used when reading through a [`ByteSource`].
    pub io_buffer_size: usize,
    /// FFmpeg's own log verbosity, applied on first initialisation.
    pub log_level: LogLevel,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            io_buffer_size: DEFAULT_IO_BUFFER_SIZE,
            log_level: LogLevel::default(),
        }
    }
}

impl SourceConfig {
    pub fn with_io_buffer_size(mut self, io_buffer_size: usize) -> Self {
        self.io_buffer_size = io_buffer_size;
        self
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.log_level = log_level;
        self
    }
}

/**
    An opened container with its first video stream selected.

    Created by [`open`], [`Source::open`] or [`Source::from_byte_source`].
    Produces the encoded packets of the selected stream; packets of every
    other stream are skipped.
*/
pub struct Source {
    /// The FFmpeg input context. Dropped before `io`, which it reads from.
    input: InputContext,
    /// Custom I/O for byte-source inputs.
    io: Option<CustomIo>,
    /// The selected video stream.
    stream: VideoStreamInfo,
    codec_config: CodecConfig,
}

impl Source {
    /**
        Open a media file or URL.

        # Example

        ```ignore
        let source = Source::open("video.mp4", SourceConfig::default())?;
        println!("{}x{}", source.video_stream().width, source.video_stream().height);
        ```
    */
    pub fn open<P: AsRef<Path>>(path: P, config: SourceConfig) -> Result<Self> {
        init(config.log_level)?;

        let path = path.as_ref();
        debug!(path = %path.display(), "opening input");

        // FFmpeg takes a C string, so the location must be UTF-8 without NULs
        let location = path
            .to_str()
            .ok_or_else(|| Error::open(format!("{}: path is not valid UTF-8", path.display())))?;
        if location.contains('\0') {
            return Err(Error::open(format!(
                "{}: path contains a NUL byte",
                location.escape_debug()
            )));
        }

        let input = ffmpeg_next::format::input(&location).map_err(|e| match e {
            ffmpeg_next::Error::Other { errno } if errno == ffi::ENOENT => Error::Io(
                std::io::Error::new(std::io::ErrorKind::NotFound, format!("{location}: {e}")),
            ),
            e => Error::open(format!("{location}: {e}")),
        })?;

        Self::from_input(input, None)
    }

    /**
        Open a container whose bytes are pulled from a [`ByteSource`].

        The container format is probed from the data itself.
    */
    pub fn from_byte_source(source: Box<dyn ByteSource>, config: SourceConfig) -> Result<Self> {
        init(config.log_level)?;

        debug!(buffer_size = config.io_buffer_size, "opening byte source");
        let mut io = CustomIo::new(source, config.io_buffer_size)?;

        let mut ctx = unsafe { ffi::avformat_alloc_context() };
        if ctx.is_null() {
            return Err(Error::Alloc("cannot create format context"));
        }

        unsafe {
            (*ctx).pb = io.as_mut_ptr();
        }

        // On failure FFmpeg frees the context and nulls the pointer.
        let ret =
            unsafe { ffi::avformat_open_input(&mut ctx, ptr::null(), ptr::null(), ptr::null_mut()) };
        if ret < 0 {
            return Err(Error::open(ffmpeg_next::Error::from(ret).to_string()));
        }

        let ret = unsafe { ffi::avformat_find_stream_info(ctx, ptr::null_mut()) };
        if ret < 0 {
            unsafe {
                ffi::avformat_close_input(&mut ctx);
            }
            return Err(Error::StreamInfo(ffmpeg_next::Error::from(ret).to_string()));
        }

        // SAFETY: `ctx` is an opened input context; ownership moves into the wrapper.
        let input = unsafe { InputContext::wrap(ctx) };

        Self::from_input(input, Some(io))
    }

    fn from_input(input: InputContext, io: Option<CustomIo>) -> Result<Self> {
        let (stream, codec_config) = match select_video_stream(&input) {
            Ok(selected) => selected,
            Err(e) => {
                // The format context still points into `io`
                drop(input);
                drop(io);
                return Err(e);
            }
        };

        debug!(
            index = stream.index,
            codec = %stream.codec_name,
            width = stream.width,
            height = stream.height,
            time_base = %stream.time_base,
            "selected video stream"
        );

        Ok(Self {
            input,
            io,
            stream,
            codec_config,
        })
    }

    /**
        Information about the selected video stream.
    */
    pub fn video_stream(&self) -> &VideoStreamInfo {
        &self.stream
    }

    /**
        Codec configuration of the selected video stream.

        Pass this to `ffmpeg-decode` to create a video decoder.
    */
    pub fn codec_config(&self) -> CodecConfig {
        self.codec_config.clone()
    }

    /**
        Returns true if this source reads through a [`ByteSource`].
    */
    pub fn is_custom_io(&self) -> bool {
        self.io.is_some()
    }

    /**
        Read the next packet of the selected video stream.

        Returns `Ok(Some(packet))` for each packet, `Ok(None)` at end of
        the container, or an error if demuxing fails.
    */
    pub fn next_packet(&mut self) -> Result<Option<ffmpeg_next::Packet>> {
        loop {
            // av_read_frame needs a blank packet on every call
            let mut packet = ffmpeg_next::Packet::empty();

            match packet.read(&mut self.input) {
                Ok(()) => {}
                Err(ffmpeg_next::Error::Eof) => return Ok(None),
                Err(e) => return Err(Error::codec(format!("reading packet failed: {e}"))),
            }

            if packet.stream() != self.stream.index {
                continue;
            }

            trace!(size = packet.size(), pts = ?packet.pts(), "video packet");
            return Ok(Some(packet));
        }
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("stream", &self.stream)
            .field("custom_io", &self.io.is_some())
            .finish_non_exhaustive()
    }
}

fn select_video_stream(input: &InputContext) -> Result<(VideoStreamInfo, CodecConfig)> {
    if input.nb_streams() == 0 {
        return Err(Error::StreamInfo("container exposes no streams".into()));
    }

    let stream = first_video_stream(input).ok_or(Error::NoVideoStream)?;
    let info = extract_video_stream_info(&stream);
    Ok((info, CodecConfig::new(stream.parameters().clone())))
}

/**
    Open a media file or URL with default configuration.

    This is a convenience function equivalent to `Source::open(path, SourceConfig::default())`.
*/
pub fn open<P: AsRef<Path>>(path: P) -> Result<Source> {
    Source::open(path, SourceConfig::default())
}

/**
    Iterator adapter for Source that yields video packets.
*/
impl Iterator for Source {
    type Item = Result<ffmpeg_next::Packet>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_packet().transpose()
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    use crate::fixtures::{wav, write_fixture, y4m};

    use super::*;

    fn config() -> SourceConfig {
        SourceConfig::default().with_log_level(LogLevel::Quiet)
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = Source::open("/nonexistent/clip.mp4", config()).unwrap_err();
        assert!(matches!(err, Error::Io(ref e) if e.kind() == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn audio_only_file_has_no_video_stream() {
        let file = write_fixture("tone.wav", &wav(8000, 800));
        let err = Source::open(&file.path, config()).unwrap_err();
        assert!(matches!(err, Error::NoVideoStream));
    }

    #[test]
    fn packets_of_a_file() {
        let file = write_fixture("clip.y4m", &y4m(32, 16, 25, &[16, 128, 235]));
        let source = Source::open(&file.path, config()).unwrap();

        assert!(!source.is_custom_io());
        assert_eq!(source.video_stream().width, 32);

        let packets: Vec<_> = source.collect::<Result<_>>().unwrap();
        assert_eq!(packets.len(), 3);
    }

    #[test]
    fn packets_of_a_byte_source() {
        let data = y4m(32, 16, 25, &[16, 235]);
        let mut source =
            Source::from_byte_source(Box::new(Cursor::new(data)), config()).unwrap();

        assert!(source.is_custom_io());
        assert_eq!(source.video_stream().height, 16);
        assert!(source.next_packet().unwrap().is_some());
        assert!(source.next_packet().unwrap().is_some());
        assert!(source.next_packet().unwrap().is_none());
    }

    #[test]
    fn byte_source_with_tiny_buffer() {
        let data = y4m(32, 16, 25, &[16]);
        let config = config().with_io_buffer_size(64);
        let mut source = Source::from_byte_source(Box::new(Cursor::new(data)), config).unwrap();
        assert!(source.next_packet().unwrap().is_some());
    }

    #[test]
    fn garbage_bytes_fail_to_open() {
        let data = vec![0x5au8; 2048];
        let err = Source::from_byte_source(Box::new(Cursor::new(data)), config()).unwrap_err();
        assert!(err.is_open_failure());
    }

    #[test]
    fn audio_only_byte_source_has_no_video_stream() {
        let data = wav(8000, 800);
        let err = Source::from_byte_source(Box::new(Cursor::new(data)), config()).unwrap_err();
        assert!(matches!(err, Error::NoVideoStream));
    }

    #[test]
    fn rejected_byte_source_is_released() {
        struct Tracked {
            data: Cursor<Vec<u8>>,
            dropped: Arc<AtomicBool>,
        }

        impl io::Read for Tracked {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                io::Read::read(&mut self.data, buf)
            }
        }

        impl Drop for Tracked {
            fn drop(&mut self) {
                self.dropped.store(true, Ordering::SeqCst);
            }
        }

        let dropped = Arc::new(AtomicBool::new(false));
        let source = Tracked {
            data: Cursor::new(wav(8000, 800)),
            dropped: Arc::clone(&dropped),
        };

        let err = Source::from_byte_source(Box::new(source), config()).unwrap_err();
        assert!(matches!(err, Error::NoVideoStream));
        assert!(dropped.load(Ordering::SeqCst));
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_path_fails_to_open() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let path = Path::new(OsStr::from_bytes(b"/tmp/\xff.mp4"));
        let err = Source::open(path, config()).unwrap_err();
        assert!(matches!(err, Error::Open(ref message) if message.contains("UTF-8")));
    }

    #[test]
    fn nul_in_path_fails_to_open() {
        let err = Source::open("clip\0.mp4", config()).unwrap_err();
        assert!(matches!(err, Error::Open(ref message) if message.contains("NUL")));
    }
}
