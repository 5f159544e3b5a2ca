/*!
    Read the frames of a video as BGR images.

    [`VideoInput`] opens a file, URL or caller-supplied [`ByteSource`],
    selects the first video stream and decodes it picture by picture into a
    [`BgrImage`]. Demuxing, decoding and pixel conversion are done by FFmpeg.

    # Example

    ```no_run
    use video_input::{BgrImage, VideoInput};

    let mut input = VideoInput::open_path("clip.mp4")?;
    let mut image = BgrImage::empty();
    while input.read(&mut image)? {
        println!("{}x{} every {} ms", image.width(), image.height(), input.frame_interval_ms());
    }
    # Ok::<(), video_input::Error>(())
    ```
*/

mod config;
mod input;

pub use self::config::VideoInputConfig;
pub use self::input::{Frames, VideoInput};

pub use ffmpeg_source::{ByteSource, DEFAULT_IO_BUFFER_SIZE, LogLevel, SourceConfig};
pub use ffmpeg_transform::ScalingAlgorithm;
pub use ffmpeg_types::{
    BgrImage, Error, FrameTiming, PixelFormat, Rational, Result, VideoStreamInfo,
};
