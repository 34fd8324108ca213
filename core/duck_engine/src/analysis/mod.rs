//! Speech analysis: per-slice loudness, loud/silent classification and
//! silence interval discovery.

pub mod loudness;
pub mod silence;
pub mod strategy;

pub use loudness::{LoudnessMap, LoudnessProfile, LoudnessSample, LoudnessSlice, measure_dbfs, sample_loudness};
pub use silence::{IntervalId, IntervalMap, SilenceInterval, detect_silences, find_silence};
pub use strategy::LoudnessStrategy;
