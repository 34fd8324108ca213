use std::collections::BTreeMap;

use log::debug;
use serde::Serialize;

use crate::analysis::loudness::LoudnessMap;

pub type IntervalId = u32;

/// A run of silent slices, `start_ms` and `end_ms` being the offsets of its
/// first and last slice. A silence running to the end of the track ends at the
/// track duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SilenceInterval {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl SilenceInterval {
    /// Time covered, counting the last slice in full but never past the track end.
    pub fn span_ms(&self, width_ms: u64, duration_ms: u64) -> u64 {
        (self.end_ms + width_ms).min(duration_ms) - self.start_ms
    }

    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_ms <= other.end_ms && other.start_ms <= self.end_ms
    }
}

/// Intervals keyed by discovery order, starting at 1. Discovery order is time order.
pub type IntervalMap = BTreeMap<IntervalId, SilenceInterval>;

/// Finds the first silence of at least `min_silence_ms` starting at or after `cursor_ms`.
///
/// A candidate opens on the first silent slice and grows over following silent
/// slices. A loud slice either closes it (long enough) or discards it. At the
/// end of the track an open candidate is kept if it is long enough.
///
/// The boundary key at the track duration holds no audio: it can carry an
/// open candidate to the track end but never opens one.
pub fn find_silence(map: &LoudnessMap, cursor_ms: u64, min_silence_ms: u64) -> Option<SilenceInterval> {
    let (width_ms, duration_ms) = (map.width_ms(), map.duration_ms());
    let mut candidate: Option<SilenceInterval> = None;

    for sample in map.samples_from(cursor_ms) {
        if !sample.loud {
            if let Some(open) = candidate.as_mut() {
                open.end_ms = sample.offset_ms;
            } else if sample.offset_ms < duration_ms {
                candidate = Some(SilenceInterval {
                    start_ms: sample.offset_ms,
                    end_ms: sample.offset_ms,
                });
            }
            continue;
        }

        if let Some(found) = candidate.take() {
            if found.span_ms(width_ms, duration_ms) >= min_silence_ms {
                return Some(found);
            }
        }
    }

    candidate.filter(|found| found.span_ms(width_ms, duration_ms) >= min_silence_ms)
}

/// Collects every qualifying silence, left to right.
///
/// Each search resumes one slice after the previous interval's end, so
/// intervals are maximal, ordered and never overlap, and no slice is scanned twice.
pub fn detect_silences(map: &LoudnessMap, min_silence_ms: u64) -> IntervalMap {
    let mut intervals = IntervalMap::new();
    let mut next_id: IntervalId = 1;
    let mut cursor_ms = 0;

    while cursor_ms <= map.duration_ms() {
        let Some(found) = find_silence(map, cursor_ms, min_silence_ms) else {
            break;
        };

        debug!(
            "silence #{next_id}: {} ms -> {} ms",
            found.start_ms, found.end_ms
        );
        intervals.insert(next_id, found);
        next_id += 1;
        cursor_ms = found.end_ms + map.width_ms();
    }

    intervals
}
