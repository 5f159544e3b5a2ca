use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::commands::{FileCommand, PlayCommand, WebCommand};

/**
    Read the frames of a video and report their pacing.
*/
#[derive(Parser)]
#[command(name = "vidframes")]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Open a file or URL with FFmpeg's own protocols.
    Play(PlayCommand),
    /// Feed a file through a byte source.
    File(FileCommand),
    /// Feed a URL through HTTP range requests.
    Web(WebCommand),
}

impl Cli {
    pub fn run(self) -> Result<()> {
        match self.command {
            Command::Play(cmd) => cmd.run(),
            Command::File(cmd) => cmd.run(),
            Command::Web(cmd) => cmd.run(),
        }
    }
}
