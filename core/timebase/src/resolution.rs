/// Converts between wall-clock milliseconds and frame positions at a fixed sample rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameResolution {
    sample_rate: u32,
}

impl FrameResolution {
    pub const fn new(sample_rate: u32) -> Self {
        Self { sample_rate }
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Frame index reached after `ms` milliseconds, truncated toward zero.
    pub fn frames_for_ms(&self, ms: u64) -> usize {
        let frames = u128::from(ms) * u128::from(self.sample_rate) / 1000;
        usize::try_from(frames).unwrap_or(usize::MAX)
    }

    /// Length of `frames` in milliseconds, rounded to the nearest millisecond.
    pub fn ms_for_frames(&self, frames: usize) -> u64 {
        let rate = u128::from(self.sample_rate);
        if rate == 0 {
            return 0;
        }
        let ms = (frames as u128 * 1000 + rate / 2) / rate;
        u64::try_from(ms).unwrap_or(u64::MAX)
    }

    pub fn ms_at_frame(&self, frame: usize) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        frame as f64 * 1000.0 / f64::from(self.sample_rate)
    }

    /// Frame position of a signed, possibly fractional, timestamp. Negative times clamp to 0.
    pub fn frame_at_ms(&self, ms: f64) -> usize {
        if ms <= 0.0 {
            return 0;
        }
        (ms * f64::from(self.sample_rate) / 1000.0).round() as usize
    }
}
