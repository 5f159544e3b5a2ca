use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;
use video_input::{BgrImage, LogLevel, VideoInput, VideoInputConfig};

/**
    Pacing used when the stream does not report a frame interval.
*/
const FALLBACK_INTERVAL: Duration = Duration::from_millis(30);

/**
    Options shared by every subcommand.
*/
#[derive(Args)]
pub struct PlaybackOptions {
    /**
        Sleep for the frame interval after each frame.
    */
    #[arg(long)]
    realtime: bool,

    /**
        Stop after this many frames.
    */
    #[arg(short = 'n', long)]
    max_frames: Option<u64>,

    /**
        Write every frame as a PNG into this directory.
    */
    #[arg(short, long)]
    output: Option<PathBuf>,

    /**
        Let FFmpeg log informational messages, not only errors.
    */
    #[arg(long)]
    ffmpeg_verbose: bool,
}

impl PlaybackOptions {
    pub fn config(&self) -> VideoInputConfig {
        let log_level = if self.ffmpeg_verbose {
            LogLevel::Info
        } else {
            LogLevel::Error
        };
        VideoInputConfig::default().with_log_level(log_level)
    }

    /**
        Read frames from an opened input until it ends or `max_frames` is reached.
    */
    pub fn run(&self, input: &mut VideoInput) -> Result<()> {
        if let Some(stream) = input.stream_info() {
            info!(
                codec = %stream.codec_name,
                width = stream.width,
                height = stream.height,
                interval_ms = stream.frame_interval_ms(),
                "opened video"
            );
        }

        if let Some(dir) = &self.output {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("failed to create {}", dir.display()))?;
        }

        let mut image = BgrImage::empty();
        let mut count = 0u64;

        while self.max_frames.is_none_or(|max| count < max) {
            if !input.read(&mut image).context("failed to decode frame")? {
                break;
            }

            let interval = pacing_interval(input.frame_interval_ms());
            info!(
                frame = count,
                interval_ms = interval.as_millis() as u64,
                "read frame"
            );

            if let Some(dir) = &self.output {
                save_png(&image, &frame_path(dir, count))?;
            }

            if self.realtime {
                thread::sleep(interval);
            }

            count += 1;
        }

        info!(frames = count, "finished");
        input.release();
        Ok(())
    }
}

fn pacing_interval(frame_interval_ms: u64) -> Duration {
    if frame_interval_ms > 0 {
        Duration::from_millis(frame_interval_ms)
    } else {
        FALLBACK_INTERVAL
    }
}

fn frame_path(dir: &Path, index: u64) -> PathBuf {
    dir.join(format!("frame_{index:05}.png"))
}

fn save_png(image: &BgrImage, path: &Path) -> Result<()> {
    let (width, height) = (image.width(), image.height());
    let rgb = image::RgbImage::from_raw(width, height, image.clone().into_rgb_bytes())
        .context("frame buffer does not match its dimensions")?;
    rgb.save(path)
        .with_context(|| format!("failed to write {}", path.display()))
}
