/*!
    Process-wide FFmpeg initialisation.
*/

use std::sync::OnceLock;

use ffmpeg_next::log::{self, Level};
use tracing::debug;

use ffmpeg_types::{Error, Result};

/**
    Outcome of the one-time initialisation, shared by every caller.
*/
static INIT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

/**
    Verbosity of FFmpeg's own log output (printed to stderr by FFmpeg).
*/
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Quiet,
    #[default]
    Error,
    Warning,
    Info,
    Debug,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Quiet => Level::Quiet,
            LogLevel::Error => Level::Error,
            LogLevel::Warning => Level::Warning,
            LogLevel::Info => Level::Info,
            LogLevel::Debug => Level::Debug,
        }
    }
}

/**
    Initialise FFmpeg exactly once per process.

    Safe to call from any number of threads; concurrent callers block until
    the first one has finished and all of them observe the same outcome.
    The log level only takes effect on the call that performs the
    initialisation.
*/
pub fn init(log_level: LogLevel) -> Result<()> {
    INIT.get_or_init(|| {
        debug!(?log_level, "initializing ffmpeg");
        ffmpeg_next::init().map_err(|e| e.to_string())?;
        log::set_level(log_level.into());
        Ok(())
    })
    .clone()
    .map_err(|e| Error::open(format!("ffmpeg initialization failed: {e}")))
}
