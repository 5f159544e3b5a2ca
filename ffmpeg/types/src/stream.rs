/*!
    Stream information types.
*/

use crate::{PixelFormat, Rational};

/**
    Nominal frame timing of a video stream.

    One frame lasts `ticks_per_frame` units of `time_base`. Variable frame
    rate content only has a nominal value here.
*/
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTiming {
    pub time_base: Rational,
    pub ticks_per_frame: u32,
}

impl FrameTiming {
    pub const fn new(time_base: Rational, ticks_per_frame: u32) -> Self {
        Self {
            time_base,
            ticks_per_frame,
        }
    }

    /**
        Timing for a stream that declares a frame rate: one tick of `1 / rate`.
    */
    pub const fn from_frame_rate(rate: Rational) -> Self {
        Self::new(rate.invert(), 1)
    }

    /**
        Nominal milliseconds per frame, truncated towards zero.

        Returns 0 if the time base is unusable.
    */
    pub fn frame_interval_ms(&self) -> u64 {
        if !self.time_base.is_valid() {
            return 0;
        }
        let ms = self.ticks_per_frame as f64 * 1000.0 * self.time_base.to_f64();
        ms as u64
    }
}

/**
    Information about the selected video stream.
*/
#[derive(Clone, Debug)]
pub struct VideoStreamInfo {
    /// Index of the stream within its container.
    pub index: usize,
    /// Declared frame width in pixels.
    pub width: u32,
    /// Declared frame height in pixels.
    pub height: u32,
    /// Native pixel format, if known and named.
    pub pixel_format: Option<PixelFormat>,
    /// Time base for packet timestamps.
    pub time_base: Rational,
    /// Declared frame rate (may be unavailable).
    pub frame_rate: Option<Rational>,
    /// Nominal frame timing used for pacing.
    pub timing: FrameTiming,
    /// Short codec name, e.g. "h264".
    pub codec_name: String,
}

impl VideoStreamInfo {
    /**
        Returns the aspect ratio as a float.
    */
    pub fn aspect_ratio(&self) -> f64 {
        if self.height == 0 {
            return 0.0;
        }
        self.width as f64 / self.height as f64
    }

    /**
        Returns the frame rate as fps, if available.
    */
    pub fn fps(&self) -> Option<f64> {
        self.frame_rate.map(|r| r.to_f64())
    }

    pub fn frame_interval_ms(&self) -> u64 {
        self.timing.frame_interval_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(frame_rate: Option<Rational>) -> VideoStreamInfo {
        let timing = frame_rate
            .map(FrameTiming::from_frame_rate)
            .unwrap_or(FrameTiming::new(Rational::new(1, 90000), 1));
        VideoStreamInfo {
            index: 0,
            width: 1920,
            height: 1080,
            pixel_format: Some(PixelFormat::Yuv420p),
            time_base: Rational::new(1, 90000),
            frame_rate,
            timing,
            codec_name: "h264".into(),
        }
    }

    #[test]
    fn interval_for_25_fps_time_base() {
        let timing = FrameTiming::new(Rational::new(1, 25), 1);
        assert_eq!(timing.frame_interval_ms(), 40);
    }

    #[test]
    fn interval_scales_with_ticks_per_frame() {
        let timing = FrameTiming::new(Rational::new(1, 50), 2);
        assert_eq!(timing.frame_interval_ms(), 40);
    }

    #[test]
    fn interval_is_truncated() {
        let timing = FrameTiming::from_frame_rate(Rational::new(30000, 1001));
        assert_eq!(timing.frame_interval_ms(), 33);
    }

    #[test]
    fn invalid_time_base_gives_zero() {
        assert_eq!(FrameTiming::new(Rational::new(0, 1), 1).frame_interval_ms(), 0);
        assert_eq!(FrameTiming::new(Rational::new(1, 0), 1).frame_interval_ms(), 0);
    }

    #[test]
    fn video_stream_info_aspect_ratio() {
        let aspect = info(None).aspect_ratio();
        assert!((aspect - 16.0 / 9.0).abs() < 0.01);
    }

    #[test]
    fn video_stream_info_fps() {
        let info = info(Some(Rational::new(30, 1)));
        assert_eq!(info.fps(), Some(30.0));
        assert_eq!(info.frame_interval_ms(), 33);
    }
}
