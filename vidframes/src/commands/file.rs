use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use video_input::VideoInput;

use super::playback::PlaybackOptions;

/**
    Read a file through a byte source instead of FFmpeg's file protocol.
*/
#[derive(Args)]
pub struct FileCommand {
    /**
        Path of the video file.
    */
    path: PathBuf,

    #[command(flatten)]
    playback: PlaybackOptions,
}

impl FileCommand {
    pub fn run(self) -> Result<()> {
        let file = File::open(&self.path)
            .with_context(|| format!("failed to open {}", self.path.display()))?;

        let mut input = VideoInput::with_config(self.playback.config());
        input
            .open_byte_source(file)
            .with_context(|| format!("failed to read video from {}", self.path.display()))?;

        self.playback.run(&mut input)
    }
}
