/*!
    Pixel format conversion for the video input crates.

    Converts decoded pictures from their native layout into packed BGR24
    images through FFmpeg's software scaler.
*/

mod video;

pub use self::video::{BgrConverter, ScalingAlgorithm, copy_rows};
