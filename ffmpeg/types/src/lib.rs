/*!
    Shared types for the video input crates.

    This crate defines the vocabulary that crosses crate boundaries: errors,
    rationals, pixel formats, stream descriptions and the BGR output image.
    It has no dependency on FFmpeg, so consumers can name these types without
    pulling in FFmpeg bindings.
*/

mod error;
mod format;
mod image;
mod rational;
mod stream;

pub use self::error::{Error, Result};
pub use self::format::PixelFormat;
pub use self::image::BgrImage;
pub use self::rational::Rational;
pub use self::stream::{FrameTiming, VideoStreamInfo};
