use std::{fs, path::Path};

use log::info;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    analysis::IntervalMap,
    envelope::FadePoints,
    error::{DuckError, Result},
    scheduler::{StartingGain, segment::GainSegment},
};

/// What a run decided, kept for inspection after the fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuckingReport {
    pub run_id: Uuid,
    pub sample_rate: u32,
    pub padded_duration_ms: u64,
    pub slice_count: usize,
    pub loud_slice_count: usize,
    pub intervals: IntervalMap,
    pub fade_points: FadePoints,
    pub starting_gain: StartingGain,
    pub starting_gain_db: f32,
    pub segments: Vec<GainSegment>,
}

impl DuckingReport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_json()?).map_err(|e| DuckError::io(path, e))?;
        info!("[{}] report written to {}", self.run_id, path.display());
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "{} silences over {} ms, {} fade-ins, {} fade-outs, start {:?} ({} dB)",
            self.intervals.len(),
            self.padded_duration_ms,
            self.fade_points.fade_ins.len(),
            self.fade_points.fade_outs.len(),
            self.starting_gain,
            self.starting_gain_db
        )
    }
}
