/*!
    Video stream discovery.
*/

use ffmpeg_next::{format::context::Input as InputContext, format::stream::Stream, media::Type};

use ffmpeg_types::{FrameTiming, Rational, VideoStreamInfo};

use crate::convert::rational_from_ffmpeg;

/**
    Find the first video stream in container order.

    Unlike FFmpeg's "best stream" heuristic this always picks the first one,
    so the selection is stable regardless of bitrates or dispositions.
*/
pub(crate) fn first_video_stream(input_ctx: &InputContext) -> Option<Stream<'_>> {
    input_ctx
        .streams()
        .find(|stream| stream.parameters().medium() == Type::Video)
}

/**
    Extract video stream info from a stream of the input context.
*/
pub(crate) fn extract_video_stream_info(stream: &Stream<'_>) -> VideoStreamInfo {
    let time_base = rational_from_ffmpeg(stream.time_base());
    let frame_rate = declared_frame_rate(stream);

    let timing = match frame_rate {
        Some(rate) => FrameTiming::from_frame_rate(rate),
        None => FrameTiming::new(time_base, 1),
    };

    let parameters = stream.parameters();

    // SAFETY: We're reading from a valid AVCodecParameters pointer that FFmpeg owns
    let (width, height) = unsafe {
        let ptr = parameters.as_ptr();
        ((*ptr).width.max(0) as u32, (*ptr).height.max(0) as u32)
    };

    VideoStreamInfo {
        index: stream.index(),
        width,
        height,
        // Filled in once the decoder is open
        pixel_format: None,
        time_base,
        frame_rate,
        timing,
        codec_name: parameters.id().name().to_string(),
    }
}

/**
    The stream's average frame rate, falling back to its real base rate.
*/
fn declared_frame_rate(stream: &Stream<'_>) -> Option<Rational> {
    [stream.avg_frame_rate(), stream.rate()]
        .into_iter()
        .map(rational_from_ffmpeg)
        .find(|rate| rate.is_valid())
}
