use log::debug;

use crate::{error::Result, track::AudioBuffer};

/// Surrounds the speech with digital silence so the music can swell before the
/// first word and after the last one.
///
/// The result is `opening ⧺ speech ⧺ closing` at the speech's sample rate and
/// channel layout. Durations are exact whenever the paddings fall on frame
/// boundaries.
pub fn pad_track(speech: &AudioBuffer, opening_ms: u64, closing_ms: u64) -> Result<AudioBuffer> {
    let opening = AudioBuffer::silent(speech.sample_rate(), speech.channels(), opening_ms)?;
    let closing = AudioBuffer::silent(speech.sample_rate(), speech.channels(), closing_ms)?;

    let padded = opening.concat(speech)?.concat(&closing)?;
    debug!(
        "padded {}: {} ms -> {} ms",
        speech.name(),
        speech.duration_ms(),
        padded.duration_ms()
    );

    Ok(AudioBuffer {
        name: speech.name().to_owned(),
        ..padded
    })
}
