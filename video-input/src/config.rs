/*!
    Video input configuration.
*/

use ffmpeg_source::{LogLevel, SourceConfig};
use ffmpeg_transform::ScalingAlgorithm;

/**
    Configuration for a [`VideoInput`](crate::VideoInput).
*/
#[derive(Clone, Debug, Default)]
pub struct VideoInputConfig {
    /// How inputs are opened.
    pub source: SourceConfig,
    /// Resampling used if a picture does not match the declared stream size.
    pub scaling: ScalingAlgorithm,
}

impl VideoInputConfig {
    /**
        Set the buffer size used for [`ByteSource`](crate::ByteSource) inputs.

        Network sources usually want a larger buffer than the default.
    */
    pub fn with_io_buffer_size(mut self, io_buffer_size: usize) -> Self {
        self.source.io_buffer_size = io_buffer_size;
        self
    }

    pub fn with_log_level(mut self, log_level: LogLevel) -> Self {
        self.source.log_level = log_level;
        self
    }

    pub fn with_scaling(mut self, scaling: ScalingAlgorithm) -> Self {
        self.scaling = scaling;
        self
    }
}
