/*!
    Conversion of decoded pictures into BGR images.
*/

use ffmpeg_next::{
    format::Pixel,
    software::scaling::{context::Context as ScalerContext, flag::Flags as ScalerFlags},
    util::frame::video::Video as VideoFrameFFmpeg,
};
use tracing::{debug, warn};

use ffmpeg_types::{BgrImage, Error, Result};

/**
    Scaling algorithm used when the converter has to resample.
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScalingAlgorithm {
    /// Nearest neighbor - fastest, lowest quality.
    Nearest,
    /// Bilinear interpolation - fast, acceptable quality.
    #[default]
    Bilinear,
    /// Bicubic interpolation - moderate speed, good quality.
    Bicubic,
    /// Lanczos resampling - slowest, highest quality.
    Lanczos,
}

impl ScalingAlgorithm {
    fn to_ffmpeg_flags(self) -> ScalerFlags {
        match self {
            Self::Nearest => ScalerFlags::POINT,
            Self::Bilinear => ScalerFlags::BILINEAR,
            Self::Bicubic => ScalerFlags::BICUBIC,
            Self::Lanczos => ScalerFlags::LANCZOS,
        }
    }
}

/**
    Converts decoded pictures into [`BgrImage`]s of a fixed size.

    The output size is the stream's declared width and height. The scaler is
    created for the source geometry and pixel format, either up front with
    [`prepare`](Self::prepare) or on the first conversion, and rebuilt if a
    picture arrives with a different geometry or format.
*/
pub struct BgrConverter {
    width: u32,
    height: u32,
    algorithm: ScalingAlgorithm,
    /// Cached scaler context and the input format it was created for.
    scaler_state: Option<ScalerState>,
    /// BGR24 picture the scaler writes into; allocated by the first run.
    output: VideoFrameFFmpeg,
}

struct ScalerState {
    context: ScalerContext,
    src_width: u32,
    src_height: u32,
    src_format: Pixel,
}

impl BgrConverter {
    /**
        Create a converter producing images of `width` x `height`.
    */
    pub fn new(width: u32, height: u32, algorithm: ScalingAlgorithm) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::conversion(format!(
                "invalid output size {width}x{height}"
            )));
        }

        Ok(Self {
            width,
            height,
            algorithm,
            scaler_state: None,
            output: VideoFrameFFmpeg::empty(),
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /**
        Returns true once a scaler exists.
    */
    pub fn is_prepared(&self) -> bool {
        self.scaler_state.is_some()
    }

    /**
        Create the scaler for pictures of the given geometry and format.

        Fails with [`Error::Conversion`].
    */
    pub fn prepare(&mut self, src_format: Pixel, src_width: u32, src_height: u32) -> Result<()> {
        self.build_scaler(src_format, src_width, src_height)
            .map_err(Error::Conversion)
    }

    fn build_scaler(
        &mut self,
        src_format: Pixel,
        src_width: u32,
        src_height: u32,
    ) -> std::result::Result<(), String> {
        if src_format == Pixel::None {
            return Err("source pixel format is unknown".into());
        }
        if src_width == 0 || src_height == 0 {
            return Err(format!("invalid source size {src_width}x{src_height}"));
        }

        let context = ScalerContext::get(
            src_format,
            src_width,
            src_height,
            Pixel::BGR24,
            self.width,
            self.height,
            self.algorithm.to_ffmpeg_flags(),
        )
        .map_err(|e| format!("cannot create scaler for {src_format:?}: {e}"))?;

        debug!(
            ?src_format,
            src_width,
            src_height,
            dst_width = self.width,
            dst_height = self.height,
            "created BGR24 scaler"
        );

        self.scaler_state = Some(ScalerState {
            context,
            src_width,
            src_height,
            src_format,
        });

        Ok(())
    }

    /**
        Convert `frame` into `image`, resizing the image to the output size.

        Failures, including a scaler rebuild that fails, are
        [`Error::Scaling`] or [`Error::InvalidData`].
    */
    pub fn convert(&mut self, frame: &VideoFrameFFmpeg, image: &mut BgrImage) -> Result<()> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(Error::invalid_data("picture has zero dimensions"));
        }

        let needs_init = match &self.scaler_state {
            None => true,
            Some(state) => {
                state.src_width != frame.width()
                    || state.src_height != frame.height()
                    || state.src_format != frame.format()
            }
        };

        if needs_init {
            if self.scaler_state.is_some() {
                warn!(
                    width = frame.width(),
                    height = frame.height(),
                    format = ?frame.format(),
                    "picture geometry changed mid-stream, rebuilding scaler"
                );
            }
            self.build_scaler(frame.format(), frame.width(), frame.height())
                .map_err(Error::Scaling)?;
        }

        let state = self
            .scaler_state
            .as_mut()
            .ok_or_else(|| Error::scaling("scaler not initialized"))?;

        state
            .context
            .run(frame, &mut self.output)
            .map_err(|e| Error::scaling(format!("scaling failed: {e}")))?;

        image.resize(self.width, self.height);
        let row_bytes = image.stride();
        copy_rows(
            self.output.data(0),
            self.output.stride(0),
            row_bytes,
            self.height as usize,
            image.as_bytes_mut(),
        );

        Ok(())
    }
}

/**
    Copy `height` rows of `row_bytes` each from a strided plane into a
    tightly packed buffer.
*/
pub fn copy_rows(src: &[u8], src_stride: usize, row_bytes: usize, height: usize, dst: &mut [u8]) {
    for (y, dst_row) in dst.chunks_exact_mut(row_bytes).take(height).enumerate() {
        let row_start = y * src_stride;
        dst_row.copy_from_slice(&src[row_start..row_start + row_bytes]);
    }
}

impl std::fmt::Debug for BgrConverter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BgrConverter")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("algorithm", &self.algorithm)
            .field("initialized", &self.scaler_state.is_some())
            .finish()
    }
}
