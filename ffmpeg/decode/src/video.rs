/*!
    Video decoder implementation.
*/

use ffmpeg_next::{
    codec::{self, decoder::Video as VideoDecoderFFmpeg},
    ffi,
    util::frame::video::Video as VideoFrameFFmpeg,
};
use tracing::{debug, trace};

use ffmpeg_source::{CodecConfig, pixel_format_from_ffmpeg};
use ffmpeg_types::{Error, PixelFormat, Result};

/**
    Outcome of asking the decoder for a picture.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecodeStatus {
    /// A picture was decoded and is now pending.
    Picture,
    /// The decoder needs another packet before it can produce a picture.
    NeedsInput,
    /// End of stream was signalled and every buffered picture was drained.
    Finished,
}

/**
    Video decoder bound to one stream.

    Packets go in with [`send_packet`](Self::send_packet), pictures come out
    with [`receive`](Self::receive). One packet may yield zero, one or several
    pictures, so callers drain with `receive` until it reports
    [`DecodeStatus::NeedsInput`] before sending more.
*/
pub struct VideoDecoder {
    decoder: VideoDecoderFFmpeg,
    picture: VideoFrameFFmpeg,
    has_picture: bool,
    codec_name: &'static str,
}

impl VideoDecoder {
    /**
        Find and open a decoder for the stream described by `codec_config`.
    */
    pub fn new(codec_config: CodecConfig) -> Result<Self> {
        let codec_name = codec_config.codec_name();
        let parameters = codec_config.into_parameters();

        let decoder_ctx = codec::context::Context::from_parameters(parameters)
            .map_err(|e| Error::open(format!("invalid codec parameters: {e}")))?;

        let decoder = decoder_ctx.decoder().video().map_err(|e| match e {
            ffmpeg_next::Error::DecoderNotFound => Error::DecoderNotFound(codec_name.to_string()),
            e => Error::open(format!("could not open codec {codec_name}: {e}")),
        })?;

        debug!(
            codec = codec_name,
            width = decoder.width(),
            height = decoder.height(),
            format = ?decoder.format(),
            "opened video decoder"
        );

        Ok(Self {
            decoder,
            picture: VideoFrameFFmpeg::empty(),
            has_picture: false,
            codec_name,
        })
    }

    pub fn codec_name(&self) -> &'static str {
        self.codec_name
    }

    /**
        Coded width as reported by the codec context.
    */
    pub fn width(&self) -> u32 {
        self.decoder.width()
    }

    /**
        Coded height as reported by the codec context.
    */
    pub fn height(&self) -> u32 {
        self.decoder.height()
    }

    /**
        Native pixel format of decoded pictures.

        May be `Pixel::None` until the first picture for codecs that only
        learn it from the bitstream.
    */
    pub fn format(&self) -> ffmpeg_next::format::Pixel {
        self.decoder.format()
    }

    /**
        Native pixel format, if it is one of the named formats.
    */
    pub fn pixel_format(&self) -> Option<PixelFormat> {
        pixel_format_from_ffmpeg(self.decoder.format())
    }

    /**
        Feed one packet to the decoder.

        Pending pictures must be drained with [`receive`](Self::receive) first.
    */
    pub fn send_packet(&mut self, packet: &ffmpeg_next::Packet) -> Result<()> {
        trace!(size = packet.size(), "sending packet");
        self.decoder
            .send_packet(packet)
            .map_err(|e| Error::codec(format!("decoding packet failed: {e}")))
    }

    /**
        Signal end of stream so delayed pictures can be drained.
    */
    pub fn send_eof(&mut self) -> Result<()> {
        match self.decoder.send_eof() {
            Ok(()) | Err(ffmpeg_next::Error::Eof) => Ok(()),
            Err(e) => Err(Error::codec(format!("flushing decoder failed: {e}"))),
        }
    }

    /**
        Try to receive the next picture, replacing the pending one.
    */
    pub fn receive(&mut self) -> Result<DecodeStatus> {
        self.has_picture = false;

        match self.decoder.receive_frame(&mut self.picture) {
            Ok(()) => {
                self.has_picture = true;
                trace!(pts = ?self.picture.pts(), "decoded picture");
                Ok(DecodeStatus::Picture)
            }
            Err(ffmpeg_next::Error::Other { errno }) if errno == ffi::EAGAIN => {
                Ok(DecodeStatus::NeedsInput)
            }
            Err(ffmpeg_next::Error::Eof) => Ok(DecodeStatus::Finished),
            Err(e) => Err(Error::codec(format!("receiving picture failed: {e}"))),
        }
    }

    /**
        The pending picture, if the last [`receive`](Self::receive) produced one.
    */
    pub fn picture(&self) -> Option<&VideoFrameFFmpeg> {
        self.has_picture.then_some(&self.picture)
    }

    /**
        Discard buffered packets and the pending picture.
    */
    pub fn reset(&mut self) {
        self.decoder.flush();
        self.has_picture = false;
    }
}

impl std::fmt::Debug for VideoDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoDecoder")
            .field("codec", &self.codec_name)
            .field("has_picture", &self.has_picture)
            .finish_non_exhaustive()
    }
}
