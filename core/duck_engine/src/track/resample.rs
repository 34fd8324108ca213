//! Sample-rate conversion using a rubato `FastFixedIn` resampler.
//!
//! Speech and music usually come from different places (a 24 kHz voice-over
//! and a 44.1 kHz song, say). Overlaying needs a shared rate, so both tracks
//! are brought to the higher of the two before mixing. When the rates already
//! match, conversion is a passthrough and no rubato session is created.

use log::info;
use rubato::{FastFixedIn, PolynomialDegree, Resampler};

use crate::{
    constants::RESAMPLER_CHUNK_FRAMES,
    error::{DuckError, Result},
    track::AudioBuffer,
};

/// Returns `buffer` at `target_rate`.
///
/// The resampler's output delay is compensated so that the converted buffer
/// keeps the original timing and has exactly `round(len * target / source)` frames.
pub fn conform_rate(buffer: &AudioBuffer, target_rate: u32) -> Result<AudioBuffer> {
    if buffer.sample_rate() == target_rate {
        return Ok(buffer.clone());
    }
    if target_rate == 0 {
        return Err(DuckError::Resample("target sample rate must be non-zero".into()));
    }

    let ratio = f64::from(target_rate) / f64::from(buffer.sample_rate());
    let mut resampler = FastFixedIn::<f32>::new(
        ratio,
        1.0, // fixed ratio
        PolynomialDegree::Cubic,
        RESAMPLER_CHUNK_FRAMES,
        2,
    )
    .map_err(|e| DuckError::Resample(format!("resampler init: {e}")))?;

    let expected = (buffer.len_frames() as f64 * ratio).round() as usize;
    let delay = resampler.output_delay();

    let (left, right): (Vec<f32>, Vec<f32>) = buffer.frames().iter().copied().unzip();
    let mut output_buf = resampler.output_buffer_allocate(true);
    let mut out_left = Vec::with_capacity(expected + delay);
    let mut out_right = Vec::with_capacity(expected + delay);

    let mut position = 0;
    while position + RESAMPLER_CHUNK_FRAMES <= left.len() {
        let end = position + RESAMPLER_CHUNK_FRAMES;
        let (_, produced) = resampler
            .process_into_buffer(
                &[&left[position..end], &right[position..end]],
                &mut output_buf,
                None,
            )
            .map_err(|e| DuckError::Resample(e.to_string()))?;
        out_left.extend_from_slice(&output_buf[0][..produced]);
        out_right.extend_from_slice(&output_buf[1][..produced]);
        position = end;
    }

    if position < left.len() {
        let (_, produced) = resampler
            .process_partial_into_buffer(
                Some(&[&left[position..], &right[position..]][..]),
                &mut output_buf,
                None,
            )
            .map_err(|e| DuckError::Resample(e.to_string()))?;
        out_left.extend_from_slice(&output_buf[0][..produced]);
        out_right.extend_from_slice(&output_buf[1][..produced]);
    }

    // flush whatever is still inside the filter
    while out_left.len() < expected + delay {
        let (_, produced) = resampler
            .process_partial_into_buffer(None::<&[&[f32]]>, &mut output_buf, None)
            .map_err(|e| DuckError::Resample(e.to_string()))?;
        if produced == 0 {
            break;
        }
        out_left.extend_from_slice(&output_buf[0][..produced]);
        out_right.extend_from_slice(&output_buf[1][..produced]);
    }

    let mut frames: Vec<(f32, f32)> = out_left
        .into_iter()
        .zip(out_right)
        .skip(delay)
        .take(expected)
        .collect();
    frames.resize(expected, (0.0, 0.0));

    info!(
        "resampled {} from {} Hz to {target_rate} Hz ({} -> {} frames)",
        buffer.name(),
        buffer.sample_rate(),
        buffer.len_frames(),
        frames.len()
    );

    AudioBuffer::new(buffer.name(), target_rate, buffer.channels(), frames)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: u32, freq: f32, frames: usize) -> AudioBuffer {
        let samples: Vec<f32> = (0..frames)
            .map(|i| (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin() * 0.5)
            .collect();
        AudioBuffer::from_mono("sine", sample_rate, &samples).unwrap()
    }

    #[test]
    fn test_same_rate_is_passthrough() {
        let source = sine(16000, 440.0, 1000);
        assert_eq!(conform_rate(&source, 16000).unwrap(), source);
    }

    #[test]
    fn test_upsample_keeps_duration() {
        let source = sine(22050, 440.0, 22050);
        let converted = conform_rate(&source, 44100).unwrap();

        assert_eq!(converted.sample_rate(), 44100);
        assert_eq!(converted.len_frames(), 44100);
        assert_eq!(converted.duration_ms(), source.duration_ms());
        assert_eq!(converted.channels(), 1);
    }

    #[test]
    fn test_downsample_preserves_level() {
        let source = sine(48000, 300.0, 48000);
        let converted = conform_rate(&source, 16000).unwrap();
        assert_eq!(converted.len_frames(), 16000);

        // steady-state peak of a 0.5 sine should survive conversion
        let peak = converted.frames()[2000..14000]
            .iter()
            .map(|f| f.0.abs())
            .fold(0.0_f32, f32::max);
        assert!((peak - 0.5).abs() < 0.05, "peak={peak}");
    }

    #[test]
    fn test_short_buffer_below_one_chunk() {
        let source = sine(8000, 200.0, 100);
        let converted = conform_rate(&source, 16000).unwrap();
        assert_eq!(converted.len_frames(), 200);
    }
}
