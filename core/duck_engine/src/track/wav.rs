use std::{
    ffi::OsString,
    fs,
    io::{Read, Seek, Write},
    path::{Path, PathBuf},
};

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{DuckError, Result},
    track::{AudioBuffer, frames_from_interleaved},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WavSampleFormat {
    #[default]
    Int16,
    Float32,
}

/// Loads a `.wav` file into a stereo-normalized [`AudioBuffer`].
///
/// Supports:
/// - Mono and Stereo files (mono is duplicated into both channels)
/// - 8/16/24/32-bit integer or 32-bit float samples (converted to `f32`)
///
/// Does NOT support more than 2 channels.
///
/// # Example
/// ```no_run
/// use duck_engine::track::wav::read_wav_file;
///
/// let speech = read_wav_file("speech.wav").unwrap();
/// ```
pub fn read_wav_file(path: impl AsRef<Path>) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let reader = WavReader::open(path).map_err(|e| wav_error(path, e))?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    from_reader(reader, &name, path)
}

pub fn read_wav_stream<R: Read>(stream: R, name: &str) -> Result<AudioBuffer> {
    let reader = WavReader::new(stream).map_err(|e| wav_error(Path::new(name), e))?;
    from_reader(reader, name, Path::new(name))
}

fn from_reader<R: Read>(reader: WavReader<R>, name: &str, path: &Path) -> Result<AudioBuffer> {
    let spec = reader.spec();
    if spec.channels == 0 || spec.channels > 2 {
        return Err(DuckError::UnsupportedLayout(format!(
            "{name}: only mono or stereo WAVs are supported, got {} channels",
            spec.channels
        )));
    }

    let raw_samples = decode_pcm_samples(reader).map_err(|e| wav_error(path, e))?;
    let frames = frames_from_interleaved(&raw_samples, spec.channels as usize)?;
    debug!(
        "decoded {name}: {} frames, {} Hz, {} ch, {}-bit {:?}",
        frames.len(),
        spec.sample_rate,
        spec.channels,
        spec.bits_per_sample,
        spec.sample_format
    );

    AudioBuffer::new(name, spec.sample_rate, spec.channels, frames)
}

fn decode_pcm_samples<R: Read>(reader: WavReader<R>) -> hound::Result<Vec<f32>> {
    let spec = reader.spec();
    match spec.sample_format {
        SampleFormat::Int => {
            let full_scale = (1_i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / full_scale))
                .collect()
        }
        SampleFormat::Float => reader.into_samples::<f32>().collect(),
    }
}

fn wav_error(path: &Path, error: hound::Error) -> DuckError {
    match error {
        hound::Error::IoError(source) => DuckError::io(path, source),
        other => DuckError::Decode {
            path: path.to_path_buf(),
            reason: other.to_string(),
        },
    }
}

pub fn write_wav<W: Write + Seek>(
    buffer: &AudioBuffer,
    writer: W,
    format: WavSampleFormat,
) -> hound::Result<()> {
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: match format {
            WavSampleFormat::Int16 => 16,
            WavSampleFormat::Float32 => 32,
        },
        sample_format: match format {
            WavSampleFormat::Int16 => SampleFormat::Int,
            WavSampleFormat::Float32 => SampleFormat::Float,
        },
    };

    let mut writer = WavWriter::new(writer, spec)?;
    for &(l, r) in buffer.frames() {
        if buffer.channels() == 1 {
            write_sample(&mut writer, (l + r) * 0.5, format)?;
        } else {
            write_sample(&mut writer, l, format)?;
            write_sample(&mut writer, r, format)?;
        }
    }
    writer.finalize()
}

fn write_sample<W: Write + Seek>(
    writer: &mut WavWriter<W>,
    sample: f32,
    format: WavSampleFormat,
) -> hound::Result<()> {
    let sample = sample.clamp(-1.0, 1.0);
    match format {
        WavSampleFormat::Int16 => writer.write_sample((sample * f32::from(i16::MAX)) as i16),
        WavSampleFormat::Float32 => writer.write_sample(sample),
    }
}

/// Writes `buffer` to `path`. The file only appears once encoding succeeded.
pub fn export_wav(buffer: &AudioBuffer, path: &Path, format: WavSampleFormat) -> Result<()> {
    let partial = partial_path(path);
    let file = fs::File::create(&partial).map_err(|e| DuckError::io(&partial, e))?;

    let encoded = write_wav(buffer, std::io::BufWriter::new(file), format);
    if let Err(e) = encoded {
        let _ = fs::remove_file(&partial);
        return Err(DuckError::Encode {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }

    fs::rename(&partial, path).map_err(|e| {
        let _ = fs::remove_file(&partial);
        DuckError::io(path, e)
    })
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map_or_else(|| OsString::from("output"), ToOwned::to_owned);
    name.push(".partial");
    path.with_file_name(name)
}
