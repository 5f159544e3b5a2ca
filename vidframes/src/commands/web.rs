use anyhow::{Context, Result};
use clap::Args;
use video_input::VideoInput;

use super::playback::PlaybackOptions;
use crate::http_source::{DEFAULT_CHUNK_SIZE, HttpRangeSource};

/**
    Read a video over HTTP with consecutive range requests.
*/
#[derive(Args)]
pub struct WebCommand {
    /**
        URL of the video. The server must support range requests.
    */
    url: String,

    /**
        Bytes requested per range request.
    */
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    #[command(flatten)]
    playback: PlaybackOptions,
}

impl WebCommand {
    pub fn run(self) -> Result<()> {
        let source = HttpRangeSource::new(&self.url, self.chunk_size)
            .context("failed to create HTTP client")?;

        let config = self.playback.config().with_io_buffer_size(self.chunk_size);
        let mut input = VideoInput::with_config(config);
        input
            .open_byte_source(source)
            .with_context(|| format!("failed to read video from {}", self.url))?;

        self.playback.run(&mut input)
    }
}
