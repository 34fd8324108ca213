//! Run configuration, loadable from a JSON file. Every field is optional.

use std::{
    fs,
    num::NonZeroU64,
    path::{Path, PathBuf},
};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::{
    analysis::LoudnessStrategy,
    constants::{
        DEFAULT_CLOSING_SILENCE_MS, DEFAULT_FADE_IN_MS, DEFAULT_FADE_OUT_MS,
        DEFAULT_LOUD_LEVEL_DB, DEFAULT_LOUDNESS_THRESHOLD_DBFS, DEFAULT_MIN_SILENCE_MS,
        DEFAULT_OPENING_SILENCE_MS, DEFAULT_QUIET_LEVEL_DB, DEFAULT_SLICE_MS,
        DEFAULT_TAIL_FADE_MS,
    },
    error::{DuckError, Result},
    scheduler::GainLevels,
    track::wav::WavSampleFormat,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DuckingConfig {
    pub opening_silence_ms: u64,
    pub closing_silence_ms: u64,
    pub tail_fade_ms: u64,

    pub slice_ms: u64,
    pub loudness_threshold_dbfs: f64,
    /// shortest speech gap that lifts the music
    pub min_silence_ms: u64,
    pub strategy: LoudnessStrategy,

    /// music level during silences, dB
    pub loud_level_db: f32,
    /// music level under speech, dB
    pub quiet_level_db: f32,
    pub fade_in_ms: u64,
    pub fade_out_ms: u64,

    pub speech_path: PathBuf,
    pub music_path: PathBuf,
    pub output_path: PathBuf,
    /// Container hint (`"wav"`, `"mp3"`, ...) used instead of the file extension.
    pub speech_format: Option<String>,
    pub music_format: Option<String>,
    pub output_sample_format: WavSampleFormat,
    /// Where to write the JSON run report, if anywhere.
    pub report_path: Option<PathBuf>,
}

impl Default for DuckingConfig {
    fn default() -> Self {
        Self {
            opening_silence_ms: DEFAULT_OPENING_SILENCE_MS,
            closing_silence_ms: DEFAULT_CLOSING_SILENCE_MS,
            tail_fade_ms: DEFAULT_TAIL_FADE_MS,
            slice_ms: DEFAULT_SLICE_MS,
            loudness_threshold_dbfs: DEFAULT_LOUDNESS_THRESHOLD_DBFS,
            min_silence_ms: DEFAULT_MIN_SILENCE_MS,
            strategy: LoudnessStrategy::default(),
            loud_level_db: DEFAULT_LOUD_LEVEL_DB,
            quiet_level_db: DEFAULT_QUIET_LEVEL_DB,
            fade_in_ms: DEFAULT_FADE_IN_MS,
            fade_out_ms: DEFAULT_FADE_OUT_MS,
            speech_path: PathBuf::from("speech.wav"),
            music_path: PathBuf::from("bgm.mp3"),
            output_path: PathBuf::from("final.wav"),
            speech_format: None,
            music_format: None,
            output_sample_format: WavSampleFormat::default(),
            report_path: None,
        }
    }
}

impl DuckingConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| DuckError::io(path, e))?;
        let config = Self::from_json_str(&raw)?;
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that would make a run meaningless.
    ///
    /// Conditions that depend on the audio (minimum silence or tail fade
    /// longer than the track) are checked once the tracks are loaded.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("slice_ms", self.slice_ms),
            ("min_silence_ms", self.min_silence_ms),
            ("fade_in_ms", self.fade_in_ms),
            ("fade_out_ms", self.fade_out_ms),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, value)| *value == 0) {
            return Err(DuckError::config(format!("{name} must be positive")));
        }

        if !self.loudness_threshold_dbfs.is_finite() {
            return Err(DuckError::config("loudness_threshold_dbfs must be finite"));
        }
        if !self.loud_level_db.is_finite() || !self.quiet_level_db.is_finite() {
            return Err(DuckError::config("music levels must be finite"));
        }

        self.strategy.validate()?;

        if self.quiet_level_db >= self.loud_level_db {
            warn!(
                "quiet level ({} dB) is not below loud level ({} dB); music will not duck",
                self.quiet_level_db, self.loud_level_db
            );
        }

        Ok(())
    }

    pub fn slice_width(&self) -> Result<NonZeroU64> {
        NonZeroU64::new(self.slice_ms).ok_or_else(|| DuckError::config("slice_ms must be positive"))
    }

    pub const fn levels(&self) -> GainLevels {
        GainLevels {
            quiet_db: self.quiet_level_db,
            loud_db: self.loud_level_db,
        }
    }
}
