/*!
    The video input adapter.
*/

use std::path::Path;

use ffmpeg_decode::{DecodeStatus, VideoDecoder};
use ffmpeg_next::format::Pixel;
use ffmpeg_source::{ByteSource, Source};
use ffmpeg_transform::BgrConverter;
use ffmpeg_types::{BgrImage, Result, VideoStreamInfo};
use tracing::{debug, trace};

use crate::config::VideoInputConfig;

/**
    Where the decode cursor stands.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ReadState {
    /// Packets are still being read from the container.
    Reading,
    /// The container is exhausted; delayed pictures are being drained.
    Draining,
    /// End of stream or a failure; nothing more will be produced.
    Finished,
}

/**
    Everything owned by an opened input. Created and dropped as a whole.
*/
struct Opened {
    source: Source,
    decoder: VideoDecoder,
    converter: BgrConverter,
    stream: VideoStreamInfo,
    state: ReadState,
    picture_ready: bool,
    pictures: u64,
}

impl Opened {
    fn new(source: Source, config: &VideoInputConfig) -> Result<Self> {
        let decoder = VideoDecoder::new(source.codec_config())?;

        let mut stream = source.video_stream().clone();
        if stream.width == 0 || stream.height == 0 {
            stream.width = decoder.width();
            stream.height = decoder.height();
        }
        stream.pixel_format = decoder.pixel_format();

        let mut converter = BgrConverter::new(stream.width, stream.height, config.scaling)?;

        // Some codecs only learn their pixel format from the first picture
        if decoder.format() != Pixel::None {
            converter.prepare(decoder.format(), stream.width, stream.height)?;
        }

        Ok(Self {
            source,
            decoder,
            converter,
            stream,
            state: ReadState::Reading,
            picture_ready: false,
            pictures: 0,
        })
    }

    /**
        Move the decoder to the next picture.

        Pictures already buffered in the decoder are drained before more
        packets are read, so packets that yield zero or several pictures
        are handled.
    */
    fn advance(&mut self) -> Result<bool> {
        self.picture_ready = false;

        loop {
            if self.state == ReadState::Finished {
                return Ok(false);
            }

            match self.decoder.receive()? {
                DecodeStatus::Picture => {
                    self.picture_ready = true;
                    self.pictures += 1;
                    return Ok(true);
                }
                DecodeStatus::Finished => {
                    debug!(pictures = self.pictures, "end of video stream");
                    self.state = ReadState::Finished;
                    return Ok(false);
                }
                DecodeStatus::NeedsInput => {}
            }

            match self.state {
                ReadState::Reading => match self.source.next_packet()? {
                    Some(packet) => self.decoder.send_packet(&packet)?,
                    None => {
                        trace!("container exhausted, draining decoder");
                        self.decoder.send_eof()?;
                        self.state = ReadState::Draining;
                    }
                },
                ReadState::Draining | ReadState::Finished => {
                    self.state = ReadState::Finished;
                    return Ok(false);
                }
            }
        }
    }

    fn convert(&mut self, image: &mut BgrImage) -> Result<bool> {
        if !self.picture_ready {
            return Ok(false);
        }
        let Some(picture) = self.decoder.picture() else {
            return Ok(false);
        };
        self.converter.convert(picture, image)?;
        Ok(true)
    }
}

/**
    Reads the first video stream of a file, URL or byte source as a
    sequence of BGR images.

    A failed open leaves the input unopened. Reading is blocking. `Ok(false)`
    from [`read`](Self::read) or [`grab`](Self::grab) means end of stream (or
    an unopened input) and `Err` a decoding failure; either way the input is
    finished and keeps returning `Ok(false)` until it is opened again.

    Not meant for concurrent use; each input exclusively owns its FFmpeg
    state.
*/
#[derive(Default)]
pub struct VideoInput {
    config: VideoInputConfig,
    opened: Option<Opened>,
}

impl VideoInput {
    /**
        Create an unopened input with default configuration.
    */
    pub fn new() -> Self {
        Self::default()
    }

    /**
        Create an unopened input with the given configuration.
    */
    pub fn with_config(config: VideoInputConfig) -> Self {
        Self {
            config,
            opened: None,
        }
    }

    /**
        Open a file or URL.
    */
    pub fn open_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut input = Self::new();
        input.open(path)?;
        Ok(input)
    }

    /**
        Open a container read from `source`.
    */
    pub fn open_source<S: ByteSource + 'static>(source: S) -> Result<Self> {
        let mut input = Self::new();
        input.open_byte_source(source)?;
        Ok(input)
    }

    pub fn config(&self) -> &VideoInputConfig {
        &self.config
    }

    /**
        Open a file or URL, releasing whatever was open before.
    */
    pub fn open<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        self.release();
        let source = Source::open(path, self.config.source.clone())?;
        self.opened = Some(Opened::new(source, &self.config)?);
        Ok(())
    }

    /**
        Open a container read from `source`, releasing whatever was open before.
    */
    pub fn open_byte_source<S: ByteSource + 'static>(&mut self, source: S) -> Result<()> {
        self.release();
        let source = Source::from_byte_source(Box::new(source), self.config.source.clone())?;
        self.opened = Some(Opened::new(source, &self.config)?);
        Ok(())
    }

    /**
        Returns true after a successful open until [`release`](Self::release).
    */
    pub fn is_opened(&self) -> bool {
        self.opened.is_some()
    }

    /**
        Release all FFmpeg resources. Calling it again does nothing.
    */
    pub fn release(&mut self) {
        if let Some(opened) = self.opened.take() {
            debug!(pictures = opened.pictures, "releasing video input");
        }
    }

    /**
        Alias for [`release`](Self::release).
    */
    pub fn close(&mut self) {
        self.release();
    }

    /**
        The selected video stream, if opened.
    */
    pub fn stream_info(&self) -> Option<&VideoStreamInfo> {
        self.opened.as_ref().map(|opened| &opened.stream)
    }

    /**
        Declared frame width, or 0 if not opened.
    */
    pub fn width(&self) -> u32 {
        self.stream_info().map_or(0, |stream| stream.width)
    }

    /**
        Declared frame height, or 0 if not opened.
    */
    pub fn height(&self) -> u32 {
        self.stream_info().map_or(0, |stream| stream.height)
    }

    /**
        Nominal duration of one frame in whole milliseconds.

        A pacing hint derived from stream metadata, not a guarantee; 0 if
        unknown or not opened.
    */
    pub fn frame_interval_ms(&self) -> u64 {
        self.stream_info()
            .map_or(0, |stream| stream.frame_interval_ms())
    }

    /**
        Advance to the next picture without converting it.
    */
    pub fn grab(&mut self) -> Result<bool> {
        let Some(opened) = self.opened.as_mut() else {
            debug!("grab on an unopened video input");
            return Ok(false);
        };

        opened.advance().inspect_err(|e| {
            debug!(error = %e, "decoding failed, video input finished");
            opened.state = ReadState::Finished;
        })
    }

    /**
        Convert the picture reached by the last successful [`grab`](Self::grab)
        into `image`, resizing it to the stream's width and height.

        Returns `Ok(false)` if there is no such picture.
    */
    pub fn retrieve(&mut self, image: &mut BgrImage) -> Result<bool> {
        let Some(opened) = self.opened.as_mut() else {
            return Ok(false);
        };

        opened.convert(image).inspect_err(|e| {
            debug!(error = %e, "conversion failed, video input finished");
            opened.state = ReadState::Finished;
            opened.picture_ready = false;
        })
    }

    /**
        Read the next frame into `image`.

        Equivalent to [`grab`](Self::grab) followed by [`retrieve`](Self::retrieve).
    */
    pub fn read(&mut self, image: &mut BgrImage) -> Result<bool> {
        if !self.grab()? {
            return Ok(false);
        }
        self.retrieve(image)
    }

    /**
        Iterate over the remaining frames, each in a fresh image.
    */
    pub fn frames(&mut self) -> Frames<'_> {
        Frames { input: self }
    }
}

impl std::fmt::Debug for VideoInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoInput")
            .field("opened", &self.is_opened())
            .field("stream", &self.stream_info())
            .finish_non_exhaustive()
    }
}

/**
    Iterator over the remaining frames of a [`VideoInput`].

    Yields an error at most once; iteration ends after it.
*/
pub struct Frames<'a> {
    input: &'a mut VideoInput,
}

impl Iterator for Frames<'_> {
    type Item = Result<BgrImage>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut image = BgrImage::empty();
        match self.input.read(&mut image) {
            Ok(true) => Some(Ok(image)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{self, Cursor};

    use ffmpeg_source::LogLevel;
    use ffmpeg_source::fixtures::{
        BLACK_LUMA, WHITE_LUMA, m4v_with_b_frames, wav, write_fixture, y4m,
    };
    use ffmpeg_types::Error;

    use super::*;

    fn quiet() -> VideoInput {
        VideoInput::with_config(VideoInputConfig::default().with_log_level(LogLevel::Quiet))
    }

    fn clip(lumas: &[u8]) -> Vec<u8> {
        y4m(32, 16, 25, lumas)
    }

    #[test]
    fn missing_file_fails_and_stays_unopened() {
        let mut input = quiet();
        let err = input.open("/nonexistent/clip.mp4").unwrap_err();

        assert!(err.is_open_failure());
        assert!(!err.to_string().is_empty());
        assert!(!input.is_opened());
    }

    #[test]
    fn unrepresentable_path_fails_and_stays_unopened() {
        let mut input = quiet();
        let err = input.open("clip\0.mp4").unwrap_err();

        assert!(err.is_open_failure());
        assert!(!input.is_opened());
    }

    #[test]
    fn audio_only_file_reports_no_video_stream() {
        let file = write_fixture("tone.wav", &wav(8000, 800));
        let mut input = quiet();
        let err = input.open(&file.path).unwrap_err();

        assert!(matches!(err, Error::NoVideoStream));
        assert!(err.to_string().contains("no video stream"));
        assert!(!input.is_opened());
    }

    #[test]
    fn first_read_has_declared_dimensions() {
        let file = write_fixture("clip.y4m", &clip(&[WHITE_LUMA, BLACK_LUMA]));
        let mut input = quiet();
        input.open(&file.path).unwrap();
        assert!(input.is_opened());
        assert_eq!((input.width(), input.height()), (32, 16));

        let mut image = BgrImage::empty();
        assert!(input.read(&mut image).unwrap());
        assert_eq!((image.width(), image.height()), (32, 16));
        assert_eq!(image.as_bytes().len(), 32 * 16 * 3);
    }

    #[test]
    fn pixels_are_converted_to_bgr() {
        let file = write_fixture("clip.y4m", &clip(&[WHITE_LUMA, BLACK_LUMA]));
        let mut input = quiet();
        input.open(&file.path).unwrap();
        let mut image = BgrImage::empty();

        assert!(input.read(&mut image).unwrap());
        assert!(image.pixel(5, 5).iter().all(|&v| v >= 250));

        assert!(input.read(&mut image).unwrap());
        assert!(image.pixel(5, 5).iter().all(|&v| v <= 5));
    }

    #[test]
    fn end_of_stream_is_reported_and_sticky() {
        let file = write_fixture("clip.y4m", &clip(&[BLACK_LUMA, 128, WHITE_LUMA]));
        let mut input = quiet();
        input.open(&file.path).unwrap();
        let mut image = BgrImage::empty();

        for _ in 0..3 {
            assert!(input.read(&mut image).unwrap());
        }
        assert!(!input.read(&mut image).unwrap());
        assert!(!input.read(&mut image).unwrap());
        assert!(!input.grab().unwrap());
        assert!(input.is_opened());
    }

    #[test]
    fn frame_interval_of_25_fps_is_40_ms() {
        let file = write_fixture("clip.y4m", &clip(&[BLACK_LUMA]));
        let mut input = quiet();
        assert_eq!(input.frame_interval_ms(), 0);

        input.open(&file.path).unwrap();
        assert_eq!(input.frame_interval_ms(), 40);
    }

    #[test]
    fn release_is_idempotent_and_read_fails_gracefully() {
        let file = write_fixture("clip.y4m", &clip(&[BLACK_LUMA, WHITE_LUMA]));
        let mut input = quiet();
        input.open(&file.path).unwrap();

        input.release();
        assert!(!input.is_opened());
        input.close();
        assert!(!input.is_opened());

        let mut image = BgrImage::empty();
        assert!(!input.read(&mut image).unwrap());
        assert!(!input.retrieve(&mut image).unwrap());
        assert_eq!(input.frame_interval_ms(), 0);
        assert!(image.is_empty());
    }

    #[test]
    fn reopening_starts_from_the_beginning() {
        let file = write_fixture("clip.y4m", &clip(&[WHITE_LUMA]));
        let mut input = quiet();
        input.open(&file.path).unwrap();
        let mut image = BgrImage::empty();

        assert!(input.read(&mut image).unwrap());
        assert!(!input.read(&mut image).unwrap());

        input.open(&file.path).unwrap();
        assert!(input.read(&mut image).unwrap());
    }

    #[test]
    fn failed_reopen_leaves_input_unopened() {
        let file = write_fixture("clip.y4m", &clip(&[WHITE_LUMA]));
        let mut input = quiet();
        input.open(&file.path).unwrap();

        assert!(input.open("/nonexistent/other.mp4").is_err());
        assert!(!input.is_opened());
    }

    #[test]
    fn grab_then_retrieve() {
        let file = write_fixture("clip.y4m", &clip(&[WHITE_LUMA, BLACK_LUMA]));
        let mut input = quiet();
        input.open(&file.path).unwrap();
        let mut image = BgrImage::empty();

        assert!(!input.retrieve(&mut image).unwrap());

        assert!(input.grab().unwrap());
        assert!(input.grab().unwrap());
        assert!(input.retrieve(&mut image).unwrap());
        assert!(image.pixel(0, 0).iter().all(|&v| v <= 5));

        assert!(!input.grab().unwrap());
        assert!(!input.retrieve(&mut image).unwrap());
    }

    #[test]
    fn byte_source_input() {
        let data = clip(&[WHITE_LUMA, BLACK_LUMA]);
        let mut input = VideoInput::open_source(Cursor::new(data)).unwrap();

        assert_eq!(input.frame_interval_ms(), 40);
        let frames: Vec<_> = input.frames().collect::<Result<_>>().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].width(), 32);
    }

    #[test]
    fn byte_source_read_errors_end_the_stream() {
        struct Truncated {
            data: Cursor<Vec<u8>>,
        }

        impl io::Read for Truncated {
            fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
                match io::Read::read(&mut self.data, buf)? {
                    0 => Err(io::Error::other("connection reset")),
                    n => Ok(n),
                }
            }
        }

        // Probing reads only the first few frames, so the error surfaces while reading
        let mut data = clip(&[WHITE_LUMA; 200]);
        data.truncate(data.len() - 100);

        let source = Truncated {
            data: Cursor::new(data),
        };
        let mut input = VideoInput::open_source(source).unwrap();

        let mut image = BgrImage::empty();
        let mut frames = 0;
        while let Ok(true) = input.read(&mut image) {
            frames += 1;
        }

        assert_eq!(frames, 199);
        assert!(!input.read(&mut image).unwrap());
        assert!(input.is_opened());
    }

    #[test]
    fn delayed_pictures_are_drained_at_end_of_stream() {
        let lumas: Vec<u8> = (0..12).map(|i| 16 + i * 18).collect();
        let file = write_fixture("clip.m4v", &m4v_with_b_frames(64, 48, &lumas));
        let mut input = quiet();
        input.open(&file.path).unwrap();

        let frames: Vec<_> = input.frames().collect::<Result<_>>().unwrap();

        assert_eq!(frames.len(), lumas.len());
        assert!(frames.iter().all(|f| (f.width(), f.height()) == (64, 48)));
        assert!(!input.grab().unwrap());
    }

    #[test]
    fn garbage_byte_source_fails_to_open() {
        let err = VideoInput::open_source(Cursor::new(vec![0x5au8; 2048])).unwrap_err();
        assert!(err.is_open_failure());
    }
}
