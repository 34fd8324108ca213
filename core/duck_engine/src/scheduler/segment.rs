use std::cmp::Ordering;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RampKind {
    /// quiet -> loud, at the start of a silence
    FadeIn,
    /// loud -> quiet, just before speech resumes
    FadeOut,
}

#[derive(Debug, Clone, Copy)]
pub struct ScheduledRamp {
    pub start_ms: i64,
    pub duration_ms: u64,
    pub target_db: f32,
    pub kind: RampKind,
    /// insertion order, breaks ties between ramps starting together
    pub seq: usize,
}

impl ScheduledRamp {
    pub fn end_ms(&self) -> i64 {
        self.start_ms
            .saturating_add(i64::try_from(self.duration_ms).unwrap_or(i64::MAX))
    }
}

impl PartialEq for ScheduledRamp {
    fn eq(&self, other: &Self) -> bool {
        self.start_ms == other.start_ms && self.seq == other.seq
    }
}

impl Eq for ScheduledRamp {}

impl PartialOrd for ScheduledRamp {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// reversed so `BinaryHeap` pops the earliest ramp first
impl Ord for ScheduledRamp {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .start_ms
            .cmp(&self.start_ms)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// A resolved piece of the gain curve: linear in dB from `from_db` at
/// `start_ms` to `to_db` at `end_ms`. The curve holds `to_db` until the next segment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GainSegment {
    pub kind: RampKind,
    pub start_ms: i64,
    pub end_ms: i64,
    pub from_db: f32,
    pub to_db: f32,
    /// `true` when a later ramp started before this one reached its target
    pub cut: bool,
}

impl GainSegment {
    pub fn level_at(&self, ms: f64) -> f32 {
        let (start, end) = (self.start_ms as f64, self.end_ms as f64);
        if ms >= end {
            return self.to_db;
        }
        if ms <= start {
            return self.from_db;
        }
        let progress = ((ms - start) / (end - start)) as f32;
        self.from_db + (self.to_db - self.from_db) * progress
    }
}

#[cfg(test)]
mod segment_tests {
    use std::collections::BinaryHeap;

    use super::*;

    fn ramp(start_ms: i64, seq: usize) -> ScheduledRamp {
        ScheduledRamp {
            start_ms,
            duration_ms: 700,
            target_db: 3.5,
            kind: RampKind::FadeIn,
            seq,
        }
    }

    #[test]
    fn test_heap_pops_earliest_ramp_first() {
        let mut heap = BinaryHeap::from(vec![ramp(3000, 0), ramp(1000, 1), ramp(2000, 2)]);

        let order: Vec<i64> = std::iter::from_fn(|| heap.pop()).map(|r| r.start_ms).collect();
        assert_eq!(order, vec![1000, 2000, 3000]);
    }

    #[test]
    fn test_ties_keep_insertion_order() {
        let mut heap = BinaryHeap::from(vec![ramp(1000, 1), ramp(1000, 0)]);

        assert_eq!(heap.pop().map(|r| r.seq), Some(0));
        assert_eq!(heap.pop().map(|r| r.seq), Some(1));
    }

    #[test]
    fn test_segment_level_interpolates_in_db() {
        let segment = GainSegment {
            kind: RampKind::FadeIn,
            start_ms: 1000,
            end_ms: 2000,
            from_db: -6.0,
            to_db: 4.0,
            cut: false,
        };

        assert_eq!(segment.level_at(0.0), -6.0);
        assert_eq!(segment.level_at(1500.0), -1.0);
        assert_eq!(segment.level_at(5000.0), 4.0);
    }
}
