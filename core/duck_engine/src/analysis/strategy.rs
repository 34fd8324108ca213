//! Loud/silent classification policies.
//!
//! `BinaryThreshold` compares each slice on its own, which works for clean
//! studio voice-overs. `ContinuousIntegral` keeps the measured levels
//! continuous until the last moment: it integrates power over a short window
//! and then ignores isolated noise bursts (a cough, a chair creak) that sit
//! inside long silences.

use serde::{Deserialize, Serialize};

use crate::{
    analysis::loudness::LoudnessProfile,
    constants::{DEFAULT_INTEGRAL_WINDOW_MS, DEFAULT_MAX_BURST_MS, DEFAULT_MIN_FLANK_MS},
    error::{DuckError, Result},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LoudnessStrategy {
    /// A slice is loud when its own level is above the threshold.
    #[default]
    BinaryThreshold,
    /// A slice is loud when the mean power of the `window_ms` around it is above
    /// the threshold. Loud runs no longer than `max_burst_ms` with at least
    /// `min_flank_ms` of silence on both sides are then treated as silence.
    ContinuousIntegral {
        #[serde(default = "default_window_ms")]
        window_ms: u64,
        #[serde(default = "default_max_burst_ms")]
        max_burst_ms: u64,
        #[serde(default = "default_min_flank_ms")]
        min_flank_ms: u64,
    },
}

const fn default_window_ms() -> u64 {
    DEFAULT_INTEGRAL_WINDOW_MS
}

const fn default_max_burst_ms() -> u64 {
    DEFAULT_MAX_BURST_MS
}

const fn default_min_flank_ms() -> u64 {
    DEFAULT_MIN_FLANK_MS
}

impl LoudnessStrategy {
    pub const fn continuous_integral() -> Self {
        Self::ContinuousIntegral {
            window_ms: DEFAULT_INTEGRAL_WINDOW_MS,
            max_burst_ms: DEFAULT_MAX_BURST_MS,
            min_flank_ms: DEFAULT_MIN_FLANK_MS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::BinaryThreshold => Ok(()),
            Self::ContinuousIntegral {
                window_ms,
                min_flank_ms,
                ..
            } => {
                if window_ms == 0 {
                    return Err(DuckError::config("integral window must be positive"));
                }
                if min_flank_ms == 0 {
                    return Err(DuckError::config("burst flank duration must be positive"));
                }
                Ok(())
            }
        }
    }

    /// One loud flag per slice of `profile`.
    pub(crate) fn classify(&self, profile: &LoudnessProfile, threshold_dbfs: f64) -> Vec<bool> {
        let levels: Vec<f64> = profile.slices().iter().map(|s| s.dbfs).collect();

        match *self {
            Self::BinaryThreshold => levels.iter().map(|&db| db > threshold_dbfs).collect(),
            Self::ContinuousIntegral {
                window_ms,
                max_burst_ms,
                min_flank_ms,
            } => {
                let width = profile.width_ms();
                let window_slices = (window_ms as f64 / width as f64).round().max(1.0) as usize;

                let mut flags: Vec<bool> = integrate(&levels, window_slices / 2)
                    .into_iter()
                    .map(|db| db > threshold_dbfs)
                    .collect();
                suppress_bursts(&mut flags, width, max_burst_ms, min_flank_ms);
                flags
            }
        }
    }
}

/// Mean power over `[i - half_span, i + half_span]` for every slice, back in dB.
fn integrate(levels: &[f64], half_span: usize) -> Vec<f64> {
    let powers: Vec<f64> = levels.iter().map(|&db| 10.0_f64.powf(db / 10.0)).collect();

    (0..powers.len())
        .map(|i| {
            let lo = i.saturating_sub(half_span);
            let hi = (i + half_span + 1).min(powers.len());
            let mean = powers[lo..hi].iter().sum::<f64>() / (hi - lo) as f64;
            10.0 * mean.log10()
        })
        .collect()
}

/// Flips short loud runs that are surrounded by long silent runs.
fn suppress_bursts(flags: &mut [bool], width_ms: u64, max_burst_ms: u64, min_flank_ms: u64) {
    // (loud, start, len) for each run of equal flags
    let mut runs: Vec<(bool, usize, usize)> = Vec::new();
    for (i, &loud) in flags.iter().enumerate() {
        match runs.last_mut() {
            Some((run_loud, _, len)) if *run_loud == loud => *len += 1,
            _ => runs.push((loud, i, 1)),
        }
    }

    let span_ms = |len: usize| len as u64 * width_ms;
    for window in runs.windows(3) {
        let &[(false, _, before), (true, start, len), (false, _, after)] = window else {
            continue;
        };
        if span_ms(len) <= max_burst_ms
            && span_ms(before) >= min_flank_ms
            && span_ms(after) >= min_flank_ms
        {
            flags[start..start + len].fill(false);
        }
    }
}

#[cfg(test)]
mod strategy_tests {
    use std::num::NonZeroU64;

    use super::*;

    const W20: NonZeroU64 = NonZeroU64::new(20).unwrap();
    const LOUD: f64 = -6.0;
    const QUIET: f64 = f64::NEG_INFINITY;

    fn levels(pattern: &[(f64, usize)]) -> Vec<f64> {
        pattern
            .iter()
            .flat_map(|&(db, n)| std::iter::repeat_n(db, n))
            .collect()
    }

    fn profile(levels: &[f64]) -> LoudnessProfile {
        // one slice per level, without the boundary slice
        let duration = (levels.len() as u64 - 1) * 20;
        LoudnessProfile::from_levels(W20, duration, levels)
    }

    #[test]
    fn test_binary_threshold_compares_each_slice() {
        let p = profile(&[LOUD, QUIET, -25.0, -19.0]);
        let flags = LoudnessStrategy::BinaryThreshold.classify(&p, -20.0);
        assert_eq!(flags, vec![true, false, false, true]);
    }

    #[test]
    fn test_burst_inside_long_silence_is_ignored() {
        // 1 s silence, 60 ms click, 1 s silence
        let p = profile(&levels(&[(QUIET, 50), (LOUD, 3), (QUIET, 50)]));
        let flags = LoudnessStrategy::continuous_integral().classify(&p, -20.0);
        assert!(flags.iter().all(|&loud| !loud));
    }

    #[test]
    fn test_burst_with_short_flank_is_kept() {
        // only 200 ms of silence before the click
        let p = profile(&levels(&[(LOUD, 20), (QUIET, 10), (LOUD, 3), (QUIET, 50)]));
        let flags = LoudnessStrategy::continuous_integral().classify(&p, -20.0);
        assert!(flags[30..33].iter().any(|&loud| loud));
    }

    #[test]
    fn test_long_speech_survives_filtering() {
        let p = profile(&levels(&[(QUIET, 50), (LOUD, 25), (QUIET, 50)]));
        let flags = LoudnessStrategy::continuous_integral().classify(&p, -20.0);
        assert!(flags[50..75].iter().all(|&loud| loud));
        assert!(!flags[0] && !flags[124]);
    }

    #[test]
    fn test_integral_smooths_single_dropout() {
        // a lone silent slice inside speech is bridged by the window average
        let p = profile(&levels(&[(LOUD, 10), (QUIET, 1), (LOUD, 10)]));
        let flags = LoudnessStrategy::ContinuousIntegral {
            window_ms: 60,
            max_burst_ms: 0,
            min_flank_ms: 800,
        }
        .classify(&p, -20.0);
        assert!(flags[10]);
    }

    #[test]
    fn test_validation_rejects_zero_windows() {
        let bad = LoudnessStrategy::ContinuousIntegral {
            window_ms: 0,
            max_burst_ms: 100,
            min_flank_ms: 800,
        };
        assert!(bad.validate().is_err());
        assert!(LoudnessStrategy::BinaryThreshold.validate().is_ok());
        assert!(LoudnessStrategy::continuous_integral().validate().is_ok());
    }

    #[test]
    fn test_strategy_deserializes_with_defaults() {
        let parsed: LoudnessStrategy =
            serde_json::from_str(r#"{ "kind": "continuous_integral", "max_burst_ms": 150 }"#)
                .unwrap();
        assert_eq!(
            parsed,
            LoudnessStrategy::ContinuousIntegral {
                window_ms: 60,
                max_burst_ms: 150,
                min_flank_ms: 800,
            }
        );
    }
}
