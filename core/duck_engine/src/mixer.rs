use log::debug;

use crate::{
    error::{DuckError, Result},
    track::{
        AudioBuffer, Frame,
        gain::{Fade, FadeCurve},
    },
};

/// Sums `top` onto `base`.
///
/// The result is exactly as long as `base`: extra `top` frames are dropped and
/// `base` plays alone where `top` runs out. The channel count is the larger of the two.
pub fn overlay(base: &AudioBuffer, top: &AudioBuffer) -> Result<AudioBuffer> {
    if base.sample_rate() != top.sample_rate() {
        return Err(DuckError::Mix(format!(
            "cannot overlay {} Hz audio onto {} Hz audio",
            top.sample_rate(),
            base.sample_rate()
        )));
    }

    let mut frames: Vec<Frame> = base.frames().to_vec();
    for ((l, r), (top_l, top_r)) in frames.iter_mut().zip(top.frames()) {
        *l += top_l;
        *r += top_r;
    }

    debug!(
        "overlaid {} onto {} ({} frames)",
        top.name(),
        base.name(),
        frames.len()
    );

    Ok(base
        .with_frames(frames)
        .with_channels(base.channels().max(top.channels())))
}

/// Fades the last `fade_ms` of `mix` linearly down to silence.
///
/// A fade longer than the mix is rejected rather than shortened.
pub fn apply_tail_fade(mix: &AudioBuffer, fade_ms: u64) -> Result<AudioBuffer> {
    let duration_ms = mix.duration_ms();
    if fade_ms > duration_ms {
        return Err(DuckError::config(format!(
            "tail fade of {fade_ms} ms is longer than the {duration_ms} ms mix"
        )));
    }

    let length_frames = mix.resolution().frames_for_ms(fade_ms).min(mix.len_frames());
    let mut out = mix.clone();
    out.apply_fade(&Fade {
        start_frame: mix.len_frames() - length_frames,
        length_frames,
        curve: FadeCurve::Amplitude { from: 1.0, to: 0.0 },
    });

    Ok(out)
}
