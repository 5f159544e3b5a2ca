use anyhow::{Context, Result};
use clap::Args;
use video_input::VideoInput;

use super::playback::PlaybackOptions;

/**
    Open a file or URL with FFmpeg's own protocols and read every frame.
*/
#[derive(Args)]
pub struct PlayCommand {
    /**
        Path or URL of the video.
    */
    input: String,

    #[command(flatten)]
    playback: PlaybackOptions,
}

impl PlayCommand {
    pub fn run(self) -> Result<()> {
        let mut input = VideoInput::with_config(self.playback.config());
        input
            .open(&self.input)
            .with_context(|| format!("failed to open {}", self.input))?;

        self.playback.run(&mut input)
    }
}
