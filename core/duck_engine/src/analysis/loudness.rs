use std::num::NonZeroU64;

use log::debug;
use serde::Serialize;
use timebase::SliceClock;

use crate::{
    analysis::strategy::LoudnessStrategy,
    constants::SILENCE_FLOOR_DBFS,
    track::{AudioBuffer, Frame},
};

/// Loudness of a frame range in dBFS, relative to a full-scale amplitude of 1.0.
///
/// The RMS runs over both channels of every frame. Empty and digitally silent
/// ranges measure `-inf`, so they are below any threshold.
pub fn measure_dbfs(frames: &[Frame]) -> f64 {
    if frames.is_empty() {
        return SILENCE_FLOOR_DBFS;
    }

    let sum_sq: f64 = frames
        .iter()
        .map(|&(l, r)| f64::from(l).powi(2) + f64::from(r).powi(2))
        .sum();
    let rms = (sum_sq / (2 * frames.len()) as f64).sqrt();
    if rms == 0.0 {
        return SILENCE_FLOOR_DBFS;
    }
    20.0 * rms.log10()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LoudnessSlice {
    pub offset_ms: u64,
    pub dbfs: f64,
}

/// Continuous per-slice loudness of a track, before any thresholding.
#[derive(Debug, Clone, PartialEq)]
pub struct LoudnessProfile {
    width_ms: u64,
    duration_ms: u64,
    slices: Vec<LoudnessSlice>,
}

impl LoudnessProfile {
    /// Measures every slice `[offset, offset + width)` of `track`, clamped to its end.
    pub fn measure(track: &AudioBuffer, width_ms: NonZeroU64) -> Self {
        let duration_ms = track.duration_ms();
        let clock = SliceClock::new(width_ms, duration_ms);
        let mut slices = Vec::with_capacity(clock.slice_count());
        slices.extend(clock.map(|window| LoudnessSlice {
            offset_ms: window.offset_ms,
            dbfs: measure_dbfs(track.frames_in_ms(window.offset_ms, window.end_ms)),
        }));

        debug!(
            "measured {} slices of {} ms over {} ({duration_ms} ms)",
            slices.len(),
            width_ms,
            track.name()
        );

        Self {
            width_ms: width_ms.get(),
            duration_ms,
            slices,
        }
    }

    /// Builds a profile from known levels, one per slice of the clock. Missing levels are silence.
    pub fn from_levels(width_ms: NonZeroU64, duration_ms: u64, levels: &[f64]) -> Self {
        let slices = SliceClock::new(width_ms, duration_ms)
            .enumerate()
            .map(|(i, window)| LoudnessSlice {
                offset_ms: window.offset_ms,
                dbfs: levels.get(i).copied().unwrap_or(SILENCE_FLOOR_DBFS),
            })
            .collect();

        Self {
            width_ms: width_ms.get(),
            duration_ms,
            slices,
        }
    }

    pub const fn width_ms(&self) -> u64 {
        self.width_ms
    }

    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn slices(&self) -> &[LoudnessSlice] {
        &self.slices
    }

    pub fn binarize(&self, threshold_dbfs: f64, strategy: &LoudnessStrategy) -> LoudnessMap {
        let flags = strategy.classify(self, threshold_dbfs);
        LoudnessMap {
            width_ms: self.width_ms,
            duration_ms: self.duration_ms,
            samples: self
                .slices
                .iter()
                .zip(flags)
                .map(|(slice, loud)| LoudnessSample {
                    offset_ms: slice.offset_ms,
                    loud,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoudnessSample {
    pub offset_ms: u64,
    pub loud: bool,
}

/// Ordered `offset -> is loud` map over a track.
///
/// Offsets are `0, w, 2w, ...` plus a final key at the duration when it is not
/// a multiple of `w`, so there are always `ceil(duration / w) + 1` samples.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoudnessMap {
    width_ms: u64,
    duration_ms: u64,
    samples: Vec<LoudnessSample>,
}

impl LoudnessMap {
    pub fn from_flags(width_ms: NonZeroU64, duration_ms: u64, flags: &[bool]) -> Self {
        let samples = SliceClock::new(width_ms, duration_ms)
            .enumerate()
            .map(|(i, window)| LoudnessSample {
                offset_ms: window.offset_ms,
                loud: flags.get(i).copied().unwrap_or(false),
            })
            .collect();

        Self {
            width_ms: width_ms.get(),
            duration_ms,
            samples,
        }
    }

    pub const fn width_ms(&self) -> u64 {
        self.width_ms
    }

    pub const fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn samples(&self) -> &[LoudnessSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn loud_count(&self) -> usize {
        self.samples.iter().filter(|s| s.loud).count()
    }

    pub fn is_loud_at(&self, offset_ms: u64) -> Option<bool> {
        self.samples
            .binary_search_by_key(&offset_ms, |s| s.offset_ms)
            .ok()
            .map(|i| self.samples[i].loud)
    }

    pub fn samples_from(&self, offset_ms: u64) -> &[LoudnessSample] {
        let start = self.samples.partition_point(|s| s.offset_ms < offset_ms);
        &self.samples[start..]
    }
}

/// Slices `track` into `width_ms` windows and flags each one as louder than `threshold_dbfs` or not.
pub fn sample_loudness(track: &AudioBuffer, width_ms: NonZeroU64, threshold_dbfs: f64) -> LoudnessMap {
    LoudnessProfile::measure(track, width_ms)
        .binarize(threshold_dbfs, &LoudnessStrategy::BinaryThreshold)
}

#[cfg(test)]
mod loudness_tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    const W20: NonZeroU64 = NonZeroU64::new(20).unwrap();

    fn constant(sample_rate: u32, amplitude: f32, duration_ms: u64) -> AudioBuffer {
        let frames = timebase::FrameResolution::new(sample_rate).frames_for_ms(duration_ms);
        AudioBuffer::from_mono("const", sample_rate, &vec![amplitude; frames]).unwrap()
    }

    #[test]
    fn test_dbfs_of_full_scale_and_half_scale() {
        assert_abs_diff_eq!(measure_dbfs(&[(1.0, 1.0); 8]), 0.0, epsilon = 1e-9);
        assert_abs_diff_eq!(measure_dbfs(&[(0.5, -0.5); 8]), -6.0206, epsilon = 1e-4);
    }

    #[test]
    fn test_dbfs_floor_for_empty_and_silent_ranges() {
        assert_eq!(measure_dbfs(&[]), f64::NEG_INFINITY);
        assert_eq!(measure_dbfs(&[(0.0, 0.0); 16]), f64::NEG_INFINITY);
    }

    #[test]
    fn test_sample_count_is_ceil_plus_one() {
        for duration_ms in [0, 19, 20, 1000, 1010, 10_007] {
            let map = sample_loudness(&constant(1000, 0.5, duration_ms), W20, -20.0);
            assert_eq!(
                map.len() as u64,
                duration_ms.div_ceil(20) + 1,
                "duration={duration_ms}"
            );
        }
    }

    #[test]
    fn test_offsets_are_contiguous_and_evenly_spaced() {
        let map = sample_loudness(&constant(8000, 0.5, 1010), W20, -20.0);
        let offsets: Vec<u64> = map.samples().iter().map(|s| s.offset_ms).collect();

        for pair in offsets[..offsets.len() - 1].windows(2) {
            assert_eq!(pair[1] - pair[0], 20);
        }
        assert_eq!(offsets.last(), Some(&1010));
        assert!(offsets.windows(2).all(|p| p[0] < p[1]));
    }

    #[test]
    fn test_threshold_is_strictly_greater_than() {
        // full scale measures exactly 0 dBFS, which is not above a 0 dBFS threshold
        let map = sample_loudness(&constant(1000, 1.0, 100), W20, 0.0);
        assert_eq!(map.loud_count(), 0);

        let map = sample_loudness(&constant(1000, 0.5, 100), W20, -20.0);
        // every full slice is loud, the empty boundary slice is silent
        assert_eq!(map.loud_count(), 5);
        assert_eq!(map.is_loud_at(100), Some(false));
    }

    #[test]
    fn test_map_lookup_helpers() {
        let map = LoudnessMap::from_flags(W20, 100, &[true, false, true]);
        assert_eq!(map.is_loud_at(0), Some(true));
        assert_eq!(map.is_loud_at(20), Some(false));
        assert_eq!(map.is_loud_at(80), Some(false)); // missing flags are silent
        assert_eq!(map.is_loud_at(30), None);
        assert_eq!(map.samples_from(30).first().map(|s| s.offset_ms), Some(40));
        assert!(map.samples_from(101).is_empty());
    }

    #[test]
    fn test_measurement_is_deterministic() {
        let track = constant(16000, 0.3, 2000);
        assert_eq!(
            LoudnessProfile::measure(&track, W20),
            LoudnessProfile::measure(&track, W20)
        );
    }
}
