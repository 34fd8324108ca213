use std::{fs::File, path::Path};

use log::{debug, warn};
use symphonia::core::{
    audio::SampleBuffer,
    codecs::{CODEC_TYPE_NULL, DecoderOptions},
    errors::Error as SymphoniaError,
    formats::FormatOptions,
    io::MediaSourceStream,
    meta::MetadataOptions,
    probe::Hint,
};

use crate::{
    error::{DuckError, Result},
    track::{AudioBuffer, frames_from_interleaved, wav},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioFormat {
    /// Decoded with `hound`
    Wav,
    /// Decoded with `symphonia`, carrying the extension used as probe hint
    Compressed(String),
}

impl AudioFormat {
    /// An explicit hint wins over the file extension. No hint and no extension means "let the probe guess".
    pub fn detect(hint: Option<&str>, path: &Path) -> Self {
        let extension = hint
            .map(|h| h.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|h| !h.is_empty())
            .or_else(|| {
                path.extension()
                    .map(|e| e.to_string_lossy().to_ascii_lowercase())
            })
            .unwrap_or_default();

        match extension.as_str() {
            "wav" | "wave" => Self::Wav,
            _ => Self::Compressed(extension),
        }
    }
}

pub fn load_audio(path: &Path, hint: Option<&str>) -> Result<AudioBuffer> {
    let format = AudioFormat::detect(hint, path);
    debug!("loading {} as {format:?}", path.display());

    match format {
        AudioFormat::Wav => wav::read_wav_file(path),
        AudioFormat::Compressed(extension) => decode_compressed(path, &extension),
    }
}

fn decode_compressed(path: &Path, extension: &str) -> Result<AudioBuffer> {
    let file = File::open(path).map_err(|e| DuckError::io(path, e))?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if !extension.is_empty() {
        hint.with_extension(extension);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| decode_error(path, &e))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| DuckError::Decode {
            path: path.to_path_buf(),
            reason: "no decodable audio track".into(),
        })?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels = track.codec_params.channels.map_or(0, |c| c.count());

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| decode_error(path, &e))?;

    let mut interleaved: Vec<f32> = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(e) => return Err(decode_error(path, &e)),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate = spec.rate;
                channels = spec.channels.count();

                let mut samples = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                samples.copy_interleaved_ref(decoded);
                interleaved.extend_from_slice(samples.samples());
            }
            Err(SymphoniaError::DecodeError(reason)) => {
                warn!("skipping corrupt packet in {}: {reason}", path.display());
            }
            Err(e) => return Err(decode_error(path, &e)),
        }
    }

    let frames = frames_from_interleaved(&interleaved, channels)?;
    let name = path
        .file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
    debug!(
        "decoded {name}: {} frames, {sample_rate} Hz, {channels} ch",
        frames.len()
    );

    AudioBuffer::new(name, sample_rate, channels as u16, frames)
}

fn decode_error(path: &Path, error: &SymphoniaError) -> DuckError {
    DuckError::Decode {
        path: path.to_path_buf(),
        reason: error.to_string(),
    }
}
