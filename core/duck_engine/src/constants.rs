/// Tolerance used when comparing rendered sample values.
pub const AUDIO_SAMPLE_EPSILON: f32 = 1e-6;

/// Loudness reported for empty or digitally silent ranges.
pub const SILENCE_FLOOR_DBFS: f64 = f64::NEG_INFINITY;

pub const RESAMPLER_CHUNK_FRAMES: usize = 1024;

pub const DEFAULT_OPENING_SILENCE_MS: u64 = 4000;
pub const DEFAULT_CLOSING_SILENCE_MS: u64 = 3000;
pub const DEFAULT_TAIL_FADE_MS: u64 = 1500;

pub const DEFAULT_SLICE_MS: u64 = 20;
pub const DEFAULT_LOUDNESS_THRESHOLD_DBFS: f64 = -20.0;
pub const DEFAULT_MIN_SILENCE_MS: u64 = 2000;

pub const DEFAULT_LOUD_LEVEL_DB: f32 = 3.5;
pub const DEFAULT_QUIET_LEVEL_DB: f32 = -6.8;
pub const DEFAULT_FADE_IN_MS: u64 = 700;
pub const DEFAULT_FADE_OUT_MS: u64 = 800;

pub const DEFAULT_INTEGRAL_WINDOW_MS: u64 = 60;
pub const DEFAULT_MAX_BURST_MS: u64 = 100;
pub const DEFAULT_MIN_FLANK_MS: u64 = 800;
