/*!
    Video decoding for the video input crates.

    This crate turns the encoded packets of the selected stream into decoded
    pictures. The decoder keeps exactly one pending picture, which is
    overwritten by every successful receive.
*/

mod video;

pub use self::video::{DecodeStatus, VideoDecoder};
