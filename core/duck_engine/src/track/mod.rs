use timebase::FrameResolution;

use crate::error::{DuckError, Result};

pub mod gain;
pub mod padding;
pub mod resample;
pub mod source;
pub mod wav;

pub type Frame = (f32, f32);

/// `AudioBuffer` is an in-memory, stereo-normalized PCM track.
///
/// Mono sources are duplicated into both channels; `channels` remembers the
/// source layout so export can write the same channel count back out.
/// Structural operations (padding, joins, resampling) return new buffers;
/// gain stages scale the frames in place.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioBuffer {
    name: String,
    sample_rate: u32,
    /// Source channel count, 1 or 2
    channels: u16,
    frames: Vec<Frame>,
}

impl AudioBuffer {
    pub fn new(
        name: impl Into<String>,
        sample_rate: u32,
        channels: u16,
        frames: Vec<Frame>,
    ) -> Result<Self> {
        if sample_rate == 0 {
            return Err(DuckError::UnsupportedLayout(
                "sample rate must be non-zero".into(),
            ));
        }
        if channels == 0 || channels > 2 {
            return Err(DuckError::UnsupportedLayout(format!(
                "only mono or stereo audio is supported, got {channels} channels"
            )));
        }

        Ok(Self {
            name: name.into(),
            sample_rate,
            channels,
            frames,
        })
    }

    pub fn from_mono(name: impl Into<String>, sample_rate: u32, samples: &[f32]) -> Result<Self> {
        let frames = samples.iter().map(|&s| (s, s)).collect();
        Self::new(name, sample_rate, 1, frames)
    }

    pub fn silent(sample_rate: u32, channels: u16, duration_ms: u64) -> Result<Self> {
        let frame_count = FrameResolution::new(sample_rate).frames_for_ms(duration_ms);
        Self::new(
            "silence",
            sample_rate,
            channels,
            vec![(0.0, 0.0); frame_count],
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub const fn channels(&self) -> u16 {
        self.channels
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn len_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub const fn resolution(&self) -> FrameResolution {
        FrameResolution::new(self.sample_rate)
    }

    pub fn duration_ms(&self) -> u64 {
        self.resolution().ms_for_frames(self.frames.len())
    }

    /// Frames covering `[start_ms, end_ms)`, clamped to the buffer. Out-of-range requests are empty.
    pub fn frames_in_ms(&self, start_ms: u64, end_ms: u64) -> &[Frame] {
        let res = self.resolution();
        let start = res.frames_for_ms(start_ms).min(self.frames.len());
        let end = res.frames_for_ms(end_ms).clamp(start, self.frames.len());
        &self.frames[start..end]
    }

    pub fn concat(&self, other: &Self) -> Result<Self> {
        if self.sample_rate != other.sample_rate {
            return Err(DuckError::Mix(format!(
                "cannot join {} Hz audio with {} Hz audio",
                self.sample_rate, other.sample_rate
            )));
        }

        let mut frames = Vec::with_capacity(self.frames.len() + other.frames.len());
        frames.extend_from_slice(&self.frames);
        frames.extend_from_slice(&other.frames);

        Ok(Self {
            name: self.name.clone(),
            sample_rate: self.sample_rate,
            channels: self.channels.max(other.channels),
            frames,
        })
    }

    pub(crate) fn with_frames(&self, frames: Vec<Frame>) -> Self {
        Self {
            name: self.name.clone(),
            sample_rate: self.sample_rate,
            channels: self.channels,
            frames,
        }
    }

    pub(crate) fn with_channels(mut self, channels: u16) -> Self {
        self.channels = channels.clamp(1, 2);
        self
    }
}

/// Converts raw interleaved samples into stereo `(L, R)` frames.
/// Mono is duplicated into both channels.
pub(crate) fn frames_from_interleaved(samples: &[f32], channels: usize) -> Result<Vec<Frame>> {
    match channels {
        1 => Ok(samples.iter().map(|&s| (s, s)).collect()),
        2 => Ok(samples
            .chunks_exact(2)
            .map(|chunk| (chunk[0], chunk[1]))
            .collect()),
        n => Err(DuckError::UnsupportedLayout(format!(
            "only mono or stereo audio is supported, got {n} channels"
        ))),
    }
}
