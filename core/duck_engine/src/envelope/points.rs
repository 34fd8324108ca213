use log::debug;
use serde::Serialize;

use crate::analysis::IntervalMap;

/// Instants (ms, padded-track time) where the music ramps.
///
/// A fade-in starts where a silence starts and brings the music up. A fade-out
/// starts `fade_in_ms` before the silence ends and brings it back down.
/// Values are signed: a fade-out of a short leading silence can land before zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FadePoints {
    pub fade_ins: Vec<i64>,
    pub fade_outs: Vec<i64>,
}

impl FadePoints {
    pub fn is_empty(&self) -> bool {
        self.fade_ins.is_empty() && self.fade_outs.is_empty()
    }
}

/// Turns silences into fade points, in interval order.
///
/// A fade-in at `0` or earlier is never recorded. Once both lists are built,
/// a leading non-positive point is dropped from each.
pub fn extract_fade_points(intervals: &IntervalMap, fade_in_ms: u64) -> FadePoints {
    let lead = i64::try_from(fade_in_ms).unwrap_or(i64::MAX);
    let mut points = FadePoints::default();

    for interval in intervals.values() {
        let start = i64::try_from(interval.start_ms).unwrap_or(i64::MAX);
        let end = i64::try_from(interval.end_ms).unwrap_or(i64::MAX);

        if start > 0 {
            points.fade_ins.push(start);
        }
        points.fade_outs.push(end.saturating_sub(lead));
    }

    drop_leading_non_positive(&mut points.fade_ins);
    drop_leading_non_positive(&mut points.fade_outs);

    debug!(
        "fade points: {} in, {} out",
        points.fade_ins.len(),
        points.fade_outs.len()
    );
    points
}

fn drop_leading_non_positive(points: &mut Vec<i64>) {
    if points.first().is_some_and(|&first| first <= 0) {
        points.remove(0);
    }
}
