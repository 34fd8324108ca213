use std::collections::BinaryHeap;

use log::debug;
use serde::Serialize;

use crate::{
    envelope::FadePoints,
    scheduler::segment::{GainSegment, RampKind, ScheduledRamp},
    track::{
        AudioBuffer,
        gain::{Fade, FadeCurve},
    },
};

pub mod segment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingGain {
    Quiet,
    Loud,
}

/// Picks the starting level from the first fade points.
///
/// | fade-ins | fade-outs | start |
/// |----------|-----------|-------|
/// | none     | none      | quiet |
/// | some     | none      | quiet |
/// | none     | some      | loud  |
/// | some     | some      | loud if the first fade-out comes first, else quiet |
pub fn decide_starting_gain(points: &FadePoints) -> StartingGain {
    match (points.fade_ins.first(), points.fade_outs.first()) {
        (None, None) | (Some(_), None) => StartingGain::Quiet,
        (None, Some(_)) => StartingGain::Loud,
        (Some(fade_in), Some(fade_out)) if fade_out < fade_in => StartingGain::Loud,
        (Some(_), Some(_)) => StartingGain::Quiet,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainLevels {
    /// under speech
    pub quiet_db: f32,
    /// during silences
    pub loud_db: f32,
}

impl GainLevels {
    pub const fn level_of(&self, gain: StartingGain) -> f32 {
        match gain {
            StartingGain::Quiet => self.quiet_db,
            StartingGain::Loud => self.loud_db,
        }
    }
}

/// The music gain over time as an absolute dB curve.
///
/// Ramps are laid down in start order. A ramp that begins while an earlier
/// one is still running cuts it short and continues from the level reached,
/// so the curve is continuous.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GainSchedule {
    pub starting: StartingGain,
    pub starting_db: f32,
    pub segments: Vec<GainSegment>,
}

impl GainSchedule {
    pub fn build(points: &FadePoints, levels: GainLevels, fade_in_ms: u64, fade_out_ms: u64) -> Self {
        let starting = decide_starting_gain(points);
        let starting_db = levels.level_of(starting);

        let fade_ins = points.fade_ins.iter().map(|&start_ms| (start_ms, fade_in_ms, levels.loud_db, RampKind::FadeIn));
        let fade_outs = points.fade_outs.iter().map(|&start_ms| (start_ms, fade_out_ms, levels.quiet_db, RampKind::FadeOut));

        let mut queue: BinaryHeap<ScheduledRamp> = fade_ins
            .chain(fade_outs)
            .enumerate()
            .map(|(seq, (start_ms, duration_ms, target_db, kind))| ScheduledRamp {
                start_ms,
                duration_ms,
                target_db,
                kind,
                seq,
            })
            .collect();

        let mut segments = Vec::with_capacity(queue.len());
        let mut level = starting_db;

        while let Some(ramp) = queue.pop() {
            let full_end = ramp.end_ms();
            let cut_at = queue
                .peek()
                .map(|next| next.start_ms)
                .filter(|&next_start| next_start < full_end);
            let end_ms = cut_at.unwrap_or(full_end);

            let to_db = match cut_at {
                Some(_) if ramp.duration_ms > 0 => {
                    let progress = (end_ms - ramp.start_ms) as f32 / ramp.duration_ms as f32;
                    level + (ramp.target_db - level) * progress
                }
                Some(_) => level,
                None => ramp.target_db,
            };

            if end_ms > ramp.start_ms {
                segments.push(GainSegment {
                    kind: ramp.kind,
                    start_ms: ramp.start_ms,
                    end_ms,
                    from_db: level,
                    to_db,
                    cut: cut_at.is_some(),
                });
            }
            level = to_db;
        }

        debug!(
            "gain schedule: start {starting:?} ({starting_db} dB), {} segments",
            segments.len()
        );

        Self {
            starting,
            starting_db,
            segments,
        }
    }

    /// Music gain in dB at `ms` on the padded timeline.
    pub fn gain_db_at(&self, ms: f64) -> f32 {
        let reached = self.segments.partition_point(|s| (s.start_ms as f64) <= ms);
        match reached.checked_sub(1).map(|i| &self.segments[i]) {
            Some(segment) => segment.level_at(ms),
            None => self.starting_db,
        }
    }

    pub fn final_db(&self) -> f32 {
        self.segments.last().map_or(self.starting_db, |s| s.to_db)
    }

    pub fn render(&self, music: &AudioBuffer) -> AudioBuffer {
        let mut out = music.clone();
        let res = out.resolution();
        let len = out.len_frames();

        let mut cursor = 0;
        let mut level = self.starting_db;

        for segment in &self.segments {
            let start = res.frame_at_ms(segment.start_ms as f64).min(len);
            let end = res.frame_at_ms(segment.end_ms as f64).min(len);

            out.apply_gain_db_between(cursor, start, level);
            if end > start {
                let from_db = segment.level_at(res.ms_at_frame(start));
                out.apply_fade(&Fade {
                    start_frame: start,
                    length_frames: end - start,
                    curve: FadeCurve::Decibel {
                        from_db,
                        to_db: segment.to_db,
                    },
                });
            }

            cursor = cursor.max(end);
            level = segment.to_db;
        }

        out.apply_gain_db_between(cursor, len, level);
        out
    }
}
