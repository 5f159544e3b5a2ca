/*!
    Synthetic media files for tests.

    YUV4MPEG2 and RIFF/WAVE are simple enough to write by hand and are
    demuxed by every FFmpeg build, so tests need no binary assets. Streams
    that need a real codec are encoded with FFmpeg's built-in MPEG-4 encoder.
*/

use std::io::Write;
use std::path::PathBuf;

use ffmpeg_next::{
    codec, encoder, format::Pixel, util::frame::video::Video as VideoFrameFFmpeg,
};
use tempfile::TempDir;

use crate::init::{LogLevel, init};

/**
    Luma values that convert to pure white and pure black in limited range.
*/
pub const WHITE_LUMA: u8 = 235;
pub const BLACK_LUMA: u8 = 16;

/**
    Build a YUV4MPEG2 (4:2:0) stream with one uniform grey level per frame.
*/
pub fn y4m(width: u32, height: u32, fps: u32, lumas: &[u8]) -> Vec<u8> {
    let mut out = format!("YUV4MPEG2 W{width} H{height} F{fps}:1 Ip A1:1 C420jpeg\n").into_bytes();
    let luma_size = (width * height) as usize;
    let chroma_size = (width.div_ceil(2) * height.div_ceil(2)) as usize;
    for &luma in lumas {
        out.extend_from_slice(b"FRAME\n");
        out.extend(std::iter::repeat_n(luma, luma_size));
        out.extend(std::iter::repeat_n(128u8, chroma_size * 2));
    }
    out
}

/**
    Build a raw MPEG-4 Part 2 elementary stream (`.m4v`) at 25 fps with
    B-frames, one uniform grey level per frame.

    The decoder holds pictures back for reordering, so the last ones only
    come out after end of stream is signalled.
*/
pub fn m4v_with_b_frames(width: u32, height: u32, lumas: &[u8]) -> Vec<u8> {
    init(LogLevel::Quiet).expect("init ffmpeg");

    let mpeg4 = encoder::find(codec::Id::MPEG4).expect("mpeg4 encoder");
    let mut config = codec::context::Context::new_with_codec(mpeg4)
        .encoder()
        .video()
        .expect("video encoder");
    config.set_width(width);
    config.set_height(height);
    config.set_format(Pixel::YUV420P);
    config.set_time_base((1, 25));
    config.set_frame_rate(Some((25, 1)));
    config.set_gop(12);
    config.set_max_b_frames(2);
    let mut encoder = config.open_as(mpeg4).expect("open mpeg4 encoder");

    let mut out = Vec::new();
    for (pts, &luma) in lumas.iter().enumerate() {
        let mut frame = VideoFrameFFmpeg::new(Pixel::YUV420P, width, height);
        frame.data_mut(0).fill(luma);
        frame.data_mut(1).fill(128);
        frame.data_mut(2).fill(128);
        frame.set_pts(Some(pts as i64));

        encoder.send_frame(&frame).expect("encode frame");
        drain_packets(&mut encoder, &mut out);
    }
    encoder.send_eof().expect("flush encoder");
    drain_packets(&mut encoder, &mut out);
    out
}

fn drain_packets(encoder: &mut encoder::video::Encoder, out: &mut Vec<u8>) {
    let mut packet = ffmpeg_next::Packet::empty();
    while encoder.receive_packet(&mut packet).is_ok() {
        out.extend_from_slice(packet.data().unwrap_or_default());
    }
}

/**
    Build a mono 16-bit PCM WAVE file of silence.
*/
pub fn wav(sample_rate: u32, samples: u32) -> Vec<u8> {
    let data_len = samples * 2;
    let mut out = Vec::with_capacity(44 + data_len as usize);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&1u16.to_le_bytes()); // mono
    out.extend_from_slice(&sample_rate.to_le_bytes());
    out.extend_from_slice(&(sample_rate * 2).to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&data_len.to_le_bytes());
    out.resize(44 + data_len as usize, 0);
    out
}

/**
    A fixture written to a temporary directory, removed on drop.
*/
pub struct FixtureFile {
    _dir: TempDir,
    pub path: PathBuf,
}

pub fn write_fixture(name: &str, bytes: &[u8]) -> FixtureFile {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("create fixture");
    file.write_all(bytes).expect("write fixture");
    FixtureFile { _dir: dir, path }
}
