use crate::track::AudioBuffer;

/// Converts a decibel offset into an amplitude multiplier. `-inf` dB is silence.
pub fn db_to_linear(db: f32) -> f32 {
    if db == f32::NEG_INFINITY {
        return 0.0;
    }
    10.0_f32.powf(db / 20.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FadeCurve {
    /// Linear in decibels, the way level automation is drawn.
    Decibel { from_db: f32, to_db: f32 },
    /// Linear in amplitude. `to: 0.0` fades to true silence.
    Amplitude { from: f32, to: f32 },
}

impl FadeCurve {
    pub fn factor_at(&self, progress: f32) -> f32 {
        let progress = progress.clamp(0.0, 1.0);
        match *self {
            Self::Decibel { from_db, to_db } => db_to_linear(from_db + (to_db - from_db) * progress),
            Self::Amplitude { from, to } => from + (to - from) * progress,
        }
    }
}

/// A gain ramp over `[start_frame, start_frame + length_frames)`. Frames outside are untouched.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fade {
    pub start_frame: usize,
    pub length_frames: usize,
    pub curve: FadeCurve,
}

impl AudioBuffer {
    pub fn apply_gain_db(&mut self, db: f32) {
        let len = self.len_frames();
        self.apply_gain_db_between(0, len, db);
    }

    /// Flat gain over `[start_frame, end_frame)`, clamped to the buffer.
    pub fn apply_gain_db_between(&mut self, start_frame: usize, end_frame: usize, db: f32) {
        let factor = db_to_linear(db);
        let end = end_frame.min(self.frames.len());
        let start = start_frame.min(end);

        for (l, r) in &mut self.frames[start..end] {
            *l *= factor;
            *r *= factor;
        }
    }

    /// Applies a ramp. Frame `i` of an `n`-frame window gets the curve at `(i + 1) / n`,
    /// so the final frame lands exactly on the target.
    pub fn apply_fade(&mut self, fade: &Fade) {
        if fade.length_frames == 0 {
            return;
        }

        let end = fade
            .start_frame
            .saturating_add(fade.length_frames)
            .min(self.frames.len());
        let start = fade.start_frame.min(end);
        let length = fade.length_frames as f32;

        for (i, (l, r)) in self.frames[start..end].iter_mut().enumerate() {
            let factor = fade.curve.factor_at((i + 1) as f32 / length);
            *l *= factor;
            *r *= factor;
        }
    }
}
