use std::num::NonZeroU64;

/// A single measurement window `[offset_ms, end_ms)` on the track timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceWindow {
    pub offset_ms: u64,
    /// Clamped to the track duration, so the last windows may be short or empty.
    pub end_ms: u64,
}

impl SliceWindow {
    pub const fn len_ms(&self) -> u64 {
        self.end_ms - self.offset_ms
    }
}

/// Walks a track of `duration_ms` in steps of `width_ms`.
///
/// Yields offsets `0, w, 2w, ...` while they stay below the duration, then one
/// boundary window starting exactly at the duration. The total number of
/// windows is always `ceil(duration / width) + 1`.
#[derive(Debug, Clone)]
pub struct SliceClock {
    width_ms: u64,
    duration_ms: u64,
    position_ms: u64,
    finished: bool,
}

impl SliceClock {
    pub const fn new(width_ms: NonZeroU64, duration_ms: u64) -> Self {
        Self {
            width_ms: width_ms.get(),
            duration_ms,
            position_ms: 0,
            finished: false,
        }
    }

    pub const fn slice_count(&self) -> usize {
        (self.duration_ms.div_ceil(self.width_ms) + 1) as usize
    }
}

impl Iterator for SliceClock {
    type Item = SliceWindow;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let offset_ms = self.position_ms;
        if offset_ms >= self.duration_ms {
            self.finished = true;
            return Some(SliceWindow {
                offset_ms: self.duration_ms,
                end_ms: self.duration_ms,
            });
        }

        self.position_ms = offset_ms + self.width_ms;
        Some(SliceWindow {
            offset_ms,
            end_ms: self.position_ms.min(self.duration_ms),
        })
    }
}
